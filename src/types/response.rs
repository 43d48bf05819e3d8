// src/types/response.rs
//! Request/response shapes of the two proxy functions.

use serde::{Deserialize, Serialize};

use crate::types::listing::JobListing;

// ===== Job search proxy =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSearchRequest {
    pub query: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page")]
    pub num_pages: u32,
}

fn default_page() -> u32 {
    1
}

impl JobSearchRequest {
    pub fn new(query: &str, location: Option<&str>, country: Option<&str>) -> Self {
        Self {
            query: query.to_string(),
            location: location.map(str::to_string),
            country: country.map(str::to_string),
            page: 1,
            num_pages: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSearchResponse {
    pub success: bool,
    pub data: Vec<JobListing>,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobSearchResponse {
    pub fn success(data: Vec<JobListing>) -> Self {
        let total = data.len();
        Self {
            success: true,
            data,
            total,
            error: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            total: 0,
            error: Some(error),
        }
    }
}

// ===== LinkedIn posts proxy =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInPostsRequest {
    pub company_username: String,
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub jobs_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInPostsResponse {
    pub success: bool,
    pub data: Vec<Post>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LinkedInPostsResponse {
    pub fn success(data: Vec<Post>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            error: Some(error),
        }
    }
}
