// src/applications/csv_io.rs
//! CSV import/export of a user's applications

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::repository::ApplicationRepository;
use graflog::app_log;
use crate::types::{ApplicationStatus, JobApplication, NewApplication};

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    company: String,
    position: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    applied_date: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn row_to_application(row: CsvRow) -> Result<NewApplication> {
    let status = match row.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<ApplicationStatus>()?),
    };
    let applied_date = match row.applied_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_date(raw).with_context(|| format!("Bad date '{}'", raw))?),
    };

    let new = NewApplication {
        company: row.company,
        position: row.position,
        status,
        applied_date,
        notes: row.notes.filter(|n| !n.trim().is_empty()),
        url: row.url.filter(|u| !u.trim().is_empty()),
    };
    new.validate()?;
    Ok(new)
}

/// Rows that fail to parse, validate or store are skipped and counted.
pub async fn import_csv(pool: &SqlitePool, user_id: &str, content: &str) -> Result<ImportSummary> {
    let repo = ApplicationRepository::new(pool);
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut summary = ImportSummary::default();

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let parsed = result
            .map_err(anyhow::Error::from)
            .and_then(row_to_application);

        let new = match parsed {
            Ok(new) => new,
            Err(e) => {
                app_log!(warn, "Skipping CSV record {}: {}", line + 1, e);
                summary.skipped += 1;
                continue;
            }
        };

        match repo.insert(user_id, new).await {
            Ok(_) => summary.imported += 1,
            Err(e) => {
                app_log!(error, "Failed to store CSV record {}: {:#}", line + 1, e);
                summary.skipped += 1;
            }
        }
    }

    app_log!(
        info,
        "CSV import for {}: {} imported, {} skipped",
        user_id,
        summary.imported,
        summary.skipped
    );
    Ok(summary)
}

pub fn export_csv(applications: &[JobApplication]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for app in applications {
        writer.serialize(CsvRow {
            company: app.company.clone(),
            position: app.position.clone(),
            status: Some(app.status.clone()),
            applied_date: Some(app.applied_date.to_rfc3339()),
            notes: app.notes.clone(),
            url: app.url.clone(),
        })?;
    }
    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}
