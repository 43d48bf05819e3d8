// src/types/listing.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_MATCH_SCORE: u8 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Contract")]
    Contract,
    #[serde(rename = "Internship")]
    Internship,
}

impl JobType {
    /// Maps the free-form employment type strings returned by job boards.
    pub fn from_employment_type(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("part") {
            JobType::PartTime
        } else if lower.contains("contract") || lower.contains("freelance") {
            JobType::Contract
        } else if lower.contains("intern") {
            JobType::Internship
        } else {
            JobType::FullTime
        }
    }
}

/// A recommended or externally fetched job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub url: String,
    pub posted: DateTime<Utc>,
    pub source: String,
    #[serde(rename = "match")]
    pub match_score: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employment_type_mapping() {
        assert_eq!(JobType::from_employment_type("FULLTIME"), JobType::FullTime);
        assert_eq!(JobType::from_employment_type("PARTTIME"), JobType::PartTime);
        assert_eq!(JobType::from_employment_type("Contractor"), JobType::Contract);
        assert_eq!(JobType::from_employment_type("INTERN"), JobType::Internship);
        assert_eq!(JobType::from_employment_type(""), JobType::FullTime);
    }

    #[test]
    fn test_listing_uses_wire_field_names() {
        let listing = JobListing {
            id: "1".to_string(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            salary: None,
            job_type: JobType::Contract,
            url: "https://example.com".to_string(),
            posted: Utc::now(),
            source: "synthetic".to_string(),
            match_score: 80,
        };
        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["type"], "Contract");
        assert_eq!(value["match"], 80);
        assert!(value.get("salary").is_none());
    }
}
