// src/recommendations/source.rs
use anyhow::Result;

use crate::core::ServiceClient;
use crate::types::{JobListing, JobSearchRequest, JobSearchResponse};

/// Where live listings come from: the in-process job-search proxy or a
/// remote deployment of it.
#[rocket::async_trait]
pub trait ListingsSource: Send + Sync {
    async fn search(&self, request: &JobSearchRequest) -> Result<Vec<JobListing>>;
}

/// Calls a remote `/api/functions/job-search` endpoint.
pub struct HttpListingsSource {
    client: ServiceClient,
}

impl HttpListingsSource {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            client: ServiceClient::new(base_url, timeout_seconds)?,
        })
    }
}

#[rocket::async_trait]
impl ListingsSource for HttpListingsSource {
    async fn search(&self, request: &JobSearchRequest) -> Result<Vec<JobListing>> {
        let response: JobSearchResponse = self
            .client
            .post_json("/api/functions/job-search", request)
            .await?;

        if !response.success {
            anyhow::bail!(
                "Listings proxy at {} reported failure: {}",
                self.client.base_url(),
                response.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
        Ok(response.data)
    }
}
