// src/types/application.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline stage of an application. Column order on the board follows
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "#3b82f6",
            ApplicationStatus::Interview => "#f59e0b",
            ApplicationStatus::Offer => "#10b981",
            ApplicationStatus::Rejected => "#ef4444",
        }
    }

    /// Case-insensitive lookup of a stored status value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "applied" => Some(ApplicationStatus::Applied),
            "interview" => Some(ApplicationStatus::Interview),
            "offer" => Some(ApplicationStatus::Offer),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown status '{}'. Use applied, interview, offer or rejected",
                s
            )
        })
    }
}

/// One row of `job_applications`. `status` is kept as the raw stored text so
/// that rows with legacy values can still be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobApplication {
    pub id: String,
    pub user_id: String,
    pub company: String,
    pub position: String,
    pub status: String,
    pub applied_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobApplication {
    pub fn known_status(&self) -> Option<ApplicationStatus> {
        ApplicationStatus::parse(&self.status)
    }
}

/// Payload of the "new application" form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewApplication {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl NewApplication {
    pub fn new(company: &str, position: &str) -> Self {
        Self {
            company: company.to_string(),
            position: position.to_string(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_applied_date(mut self, applied_date: DateTime<Utc>) -> Self {
        self.applied_date = Some(applied_date);
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.company.trim().is_empty() {
            anyhow::bail!("Company is required");
        }
        if self.position.trim().is_empty() {
            anyhow::bail!("Position is required");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_is_case_insensitive() {
        assert_eq!(
            ApplicationStatus::parse("Interview"),
            Some(ApplicationStatus::Interview)
        );
        assert_eq!(
            ApplicationStatus::parse(" OFFER "),
            Some(ApplicationStatus::Offer)
        );
        assert_eq!(ApplicationStatus::parse("ghosted"), None);
        assert!("withdrawn".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ApplicationStatus::Rejected).unwrap();
        assert_eq!(json, "\"rejected\"");
    }

    #[test]
    fn test_new_application_requires_company_and_position() {
        assert!(NewApplication::new("Acme", "Engineer").validate().is_ok());
        assert!(NewApplication::new("  ", "Engineer").validate().is_err());
        assert!(NewApplication::new("Acme", "").validate().is_err());
    }
}
