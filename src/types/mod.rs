// src/types/mod.rs
pub mod application;
pub mod listing;
pub mod response;

pub use application::{ApplicationStatus, JobApplication, NewApplication};
pub use listing::{JobListing, JobType, MAX_MATCH_SCORE};
pub use response::{
    JobSearchRequest, JobSearchResponse, LinkedInPostsRequest, LinkedInPostsResponse, Post,
};
