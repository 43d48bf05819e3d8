// src/proxy/job_search.rs
//! Server-side proxy in front of the JSearch-style job-search API. Keeps the
//! API key off the client and normalises the upstream results into
//! [`JobListing`]s.

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use graflog::app_log;
use crate::core::config_manager::ServiceConfig;
use crate::core::ServiceClient;
use crate::recommendations::ListingsSource;
use crate::types::{JobListing, JobSearchRequest, JobSearchResponse, JobType, MAX_MATCH_SCORE};

const BASE_SCORE: u32 = 60;
const TITLE_MATCH_BONUS: u32 = 25;
const DEFAULT_COUNTRY: &str = "us";
const SOURCE_FALLBACK: &str = "jsearch";

#[derive(Debug, Default, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    data: Vec<UpstreamJob>,
}

/// One upstream result. Every field is optional; boards fill them unevenly.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpstreamJob {
    job_id: Option<String>,
    job_title: Option<String>,
    employer_name: Option<String>,
    job_publisher: Option<String>,
    job_employment_type: Option<String>,
    job_apply_link: Option<String>,
    job_google_link: Option<String>,
    job_city: Option<String>,
    job_state: Option<String>,
    job_country: Option<String>,
    job_is_remote: Option<bool>,
    job_posted_at_datetime_utc: Option<String>,
    job_posted_at_timestamp: Option<i64>,
    job_min_salary: Option<f64>,
    job_max_salary: Option<f64>,
    job_salary_currency: Option<String>,
    job_salary_period: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    query: String,
    page: u32,
    num_pages: u32,
    country: &'a str,
}

/// Recency bonus by listing age in days.
fn recency_bonus(age_days: i64) -> u32 {
    match age_days {
        d if d <= 1 => 14,
        d if d <= 7 => 10,
        d if d <= 30 => 5,
        _ => 0,
    }
}

/// 60 base, +25 when the title contains the query, plus a recency bonus.
pub fn score_listing(title: &str, query: &str, posted: DateTime<Utc>, now: DateTime<Utc>) -> u8 {
    let mut score = BASE_SCORE;

    let query = query.trim().to_lowercase();
    if !query.is_empty() && title.to_lowercase().contains(&query) {
        score += TITLE_MATCH_BONUS;
    }

    let age_days = (now - posted).num_days().max(0);
    score += recency_bonus(age_days);

    score.min(u32::from(MAX_MATCH_SCORE)) as u8
}

fn currency_symbol(code: &str) -> String {
    match code.to_uppercase().as_str() {
        "USD" => "$".to_string(),
        "GBP" => "£".to_string(),
        "EUR" => "€".to_string(),
        "INR" => "₹".to_string(),
        "CAD" => "CA$".to_string(),
        "AUD" => "A$".to_string(),
        other => format!("{} ", other),
    }
}

fn format_amount(amount: f64) -> String {
    if amount >= 1000.0 {
        format!("{}k", (amount / 1000.0).round() as i64)
    } else {
        format!("{}", amount.round() as i64)
    }
}

fn format_salary(job: &UpstreamJob) -> Option<String> {
    let symbol = currency_symbol(job.job_salary_currency.as_deref().unwrap_or("USD"));
    let period = match job.job_salary_period.as_deref().map(str::to_uppercase).as_deref() {
        Some("HOUR") => "/hr",
        Some("MONTH") => "/mo",
        _ => "",
    };

    match (job.job_min_salary, job.job_max_salary) {
        (Some(min), Some(max)) => Some(format!(
            "{sym}{} - {sym}{}{}",
            format_amount(min),
            format_amount(max),
            period,
            sym = symbol
        )),
        (Some(amount), None) | (None, Some(amount)) => {
            Some(format!("{}{}{}", symbol, format_amount(amount), period))
        }
        (None, None) => None,
    }
}

fn format_location(job: &UpstreamJob) -> String {
    if job.job_is_remote.unwrap_or(false) {
        return "Remote".to_string();
    }

    let parts: Vec<&str> = [&job.job_city, &job.job_state, &job.job_country]
        .iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        "Not specified".to_string()
    } else {
        parts.join(", ")
    }
}

fn posted_at(job: &UpstreamJob, now: DateTime<Utc>) -> DateTime<Utc> {
    job.job_posted_at_datetime_utc
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            job.job_posted_at_timestamp
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        })
        .unwrap_or(now)
}

fn to_listing(job: UpstreamJob, query: &str, now: DateTime<Utc>) -> Option<JobListing> {
    let title = job
        .job_title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())?
        .to_string();

    let posted = posted_at(&job, now);
    let salary = format_salary(&job);
    let location = format_location(&job);

    Some(JobListing {
        id: job
            .job_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        match_score: score_listing(&title, query, posted, now),
        title,
        company: job
            .employer_name
            .unwrap_or_else(|| "Unknown company".to_string()),
        location,
        salary,
        job_type: JobType::from_employment_type(
            job.job_employment_type.as_deref().unwrap_or_default(),
        ),
        url: job
            .job_apply_link
            .or(job.job_google_link)
            .unwrap_or_default(),
        posted,
        source: job
            .job_publisher
            .unwrap_or_else(|| SOURCE_FALLBACK.to_string()),
    })
}

pub struct JobSearchProxy {
    /// `None` when no API key is configured.
    client: Option<ServiceClient>,
}

impl JobSearchProxy {
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = match config.job_search_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(ServiceClient::with_api_key(
                &config.job_search_url,
                config.timeout_seconds,
                key,
                &config.job_search_host,
            )?),
            _ => {
                app_log!(warn, "JOB_SEARCH_API_KEY not set, job search is disabled");
                None
            }
        };
        Ok(Self { client })
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Endpoint body: never fails, errors become `success: false`.
    pub async fn handle(&self, request: &JobSearchRequest) -> JobSearchResponse {
        match self.fetch(request).await {
            Ok(listings) => JobSearchResponse::success(listings),
            Err(e) => {
                app_log!(error, "Job search failed for '{}': {:#}", request.query, e);
                JobSearchResponse::failure(e.to_string())
            }
        }
    }

    async fn fetch(&self, request: &JobSearchRequest) -> Result<Vec<JobListing>> {
        let query = request.query.trim();
        if query.is_empty() {
            anyhow::bail!("Query is required");
        }
        let Some(client) = &self.client else {
            anyhow::bail!("Job search API key is not configured");
        };

        let full_query = match request.location.as_deref().map(str::trim) {
            Some(location) if !location.is_empty() => format!("{} in {}", query, location),
            _ => query.to_string(),
        };
        let params = SearchParams {
            query: full_query,
            page: request.page.max(1),
            num_pages: request.num_pages.max(1),
            country: request
                .country
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(DEFAULT_COUNTRY),
        };

        let envelope: SearchEnvelope = client.get_json("/search", &params).await?;
        let now = Utc::now();
        let listings: Vec<JobListing> = envelope
            .data
            .into_iter()
            .filter_map(|job| to_listing(job, query, now))
            .collect();

        app_log!(info, "Job search '{}' returned {} listings", query, listings.len());
        Ok(listings)
    }
}

#[rocket::async_trait]
impl ListingsSource for JobSearchProxy {
    async fn search(&self, request: &JobSearchRequest) -> Result<Vec<JobListing>> {
        self.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn upstream(value: serde_json::Value) -> UpstreamJob {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_score_rules() {
        let now = Utc::now();
        assert_eq!(score_listing("Rust Engineer", "rust", now, now), 99);
        assert_eq!(
            score_listing("Rust Engineer", "go", now - Duration::days(5), now),
            70
        );
        assert_eq!(
            score_listing("Senior RUST engineer", "rust engineer", now - Duration::days(20), now),
            90
        );
        assert_eq!(
            score_listing("Chef", "rust", now - Duration::days(90), now),
            60
        );
    }

    #[test]
    fn test_transforms_heterogeneous_result() {
        let now = Utc::now();
        let job = upstream(json!({
            "job_id": "abc",
            "job_title": "Backend Engineer",
            "employer_name": "Acme",
            "job_publisher": "LinkedIn",
            "job_employment_type": "FULLTIME",
            "job_apply_link": "https://acme.example/apply",
            "job_city": "Austin",
            "job_state": "TX",
            "job_country": "US",
            "job_is_remote": false,
            "job_posted_at_timestamp": (now - Duration::days(3)).timestamp(),
            "job_min_salary": 120000.0,
            "job_max_salary": 150000.0,
            "job_salary_currency": "USD",
            "job_salary_period": "YEAR",
            "unexpected_field": [1, 2, 3]
        }));

        let listing = to_listing(job, "backend", now).unwrap();
        assert_eq!(listing.id, "abc");
        assert_eq!(listing.location, "Austin, TX, US");
        assert_eq!(listing.salary.as_deref(), Some("$120k - $150k"));
        assert_eq!(listing.job_type, JobType::FullTime);
        assert_eq!(listing.source, "LinkedIn");
        assert_eq!(listing.match_score, 95);
    }

    #[test]
    fn test_sparse_result_gets_defaults_and_titleless_is_skipped() {
        let now = Utc::now();
        let sparse = to_listing(
            upstream(json!({ "job_title": "Designer", "job_is_remote": true })),
            "engineer",
            now,
        )
        .unwrap();
        assert_eq!(sparse.company, "Unknown company");
        assert_eq!(sparse.location, "Remote");
        assert_eq!(sparse.source, SOURCE_FALLBACK);
        assert!(sparse.salary.is_none());
        assert_eq!(sparse.posted, now);

        assert!(to_listing(upstream(json!({ "job_title": "  " })), "x", now).is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key_returns_failure_body() {
        let proxy = JobSearchProxy::disabled();
        let response = proxy
            .handle(&JobSearchRequest::new("rust", None, None))
            .await;
        assert!(!response.success);
        assert!(response.data.is_empty());
        assert_eq!(response.total, 0);
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let proxy = JobSearchProxy::disabled();
        let response = proxy.handle(&JobSearchRequest::new("  ", None, None)).await;
        assert_eq!(response.error.as_deref(), Some("Query is required"));
    }
}
