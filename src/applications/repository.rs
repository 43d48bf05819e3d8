// src/applications/repository.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::types::{ApplicationStatus, JobApplication, NewApplication};

const SELECT_COLUMNS: &str = "id, user_id, company, position, status, applied_date, notes, url, created_at, updated_at";

/// Field edits other than status; `None` keeps the stored value. An empty
/// `notes` or `url` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationUpdate {
    pub company: Option<String>,
    pub position: Option<String>,
    pub applied_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub url: Option<String>,
}

/// Row access for `job_applications`. Every query is filtered by `user_id`.
pub struct ApplicationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<JobApplication>> {
        let rows = sqlx::query_as::<_, JobApplication>(&format!(
            "SELECT {} FROM job_applications WHERE user_id = ? ORDER BY applied_date DESC",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find(&self, user_id: &str, id: &str) -> Result<Option<JobApplication>> {
        let row = sqlx::query_as::<_, JobApplication>(&format!(
            "SELECT {} FROM job_applications WHERE user_id = ? AND id = ?",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    pub async fn insert(&self, user_id: &str, new: NewApplication) -> Result<JobApplication> {
        new.validate()?;
        let now = Utc::now();

        let application = JobApplication {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            company: new.company.trim().to_string(),
            position: new.position.trim().to_string(),
            status: new
                .status
                .unwrap_or(ApplicationStatus::Applied)
                .as_str()
                .to_string(),
            applied_date: new.applied_date.unwrap_or(now),
            notes: new.notes,
            url: new.url,
            created_at: now,
            updated_at: now,
        };

        self.insert_row(&application).await?;
        Ok(application)
    }

    /// Insert a fully formed row, keeping its id and raw status.
    pub async fn insert_row(&self, application: &JobApplication) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO job_applications
                (id, user_id, company, position, status, applied_date, notes, url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&application.id)
        .bind(&application.user_id)
        .bind(&application.company)
        .bind(&application.position)
        .bind(&application.status)
        .bind(application.applied_date)
        .bind(&application.notes)
        .bind(&application.url)
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Returns `false` when no row of this user has the id.
    pub async fn update_status(
        &self,
        user_id: &str,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE job_applications SET status = ?, updated_at = ? WHERE user_id = ? AND id = ?",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(user_id)
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_details(
        &self,
        user_id: &str,
        id: &str,
        update: ApplicationUpdate,
    ) -> Result<Option<JobApplication>> {
        if let Some(company) = &update.company {
            if company.trim().is_empty() {
                anyhow::bail!("Company is required");
            }
        }
        if let Some(position) = &update.position {
            if position.trim().is_empty() {
                anyhow::bail!("Position is required");
            }
        }

        let notes = update.notes.map(|n| n.trim().to_string());
        let url = update.url.map(|u| u.trim().to_string());

        let result = sqlx::query(
            r#"
            UPDATE job_applications
            SET company = COALESCE(?, company),
                position = COALESCE(?, position),
                applied_date = COALESCE(?, applied_date),
                notes = CASE WHEN ? = '' THEN NULL ELSE COALESCE(?, notes) END,
                url = CASE WHEN ? = '' THEN NULL ELSE COALESCE(?, url) END,
                updated_at = ?
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(update.company.map(|c| c.trim().to_string()))
        .bind(update.position.map(|p| p.trim().to_string()))
        .bind(update.applied_date)
        .bind(notes.as_deref())
        .bind(notes.as_deref())
        .bind(url.as_deref())
        .bind(url.as_deref())
        .bind(Utc::now())
        .bind(user_id)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find(user_id, id).await
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM job_applications WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
