// src/proxy/mod.rs
//! Server-side functions that hold the third-party API keys.

pub mod job_search;
pub mod linkedin_posts;

pub use job_search::JobSearchProxy;
pub use linkedin_posts::{filter_job_posts, LinkedInPostsProxy};
