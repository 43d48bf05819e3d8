// src/web/handlers/proxy_handlers.rs
//! Both proxies answer 200 with `success: false` on upstream trouble so the
//! caller can render an empty list.

use rocket::serde::json::Json;
use rocket::State;

use graflog::app_log;
use crate::auth::OptionalAuth;
use crate::types::{JobSearchRequest, JobSearchResponse, LinkedInPostsRequest, LinkedInPostsResponse};
use crate::web::types::Proxies;

fn caller(auth: &OptionalAuth) -> &str {
    auth.user.as_ref().map(|u| u.email()).unwrap_or("anonymous")
}

pub async fn job_search_handler(
    request: Json<JobSearchRequest>,
    auth: OptionalAuth,
    proxies: &State<Proxies>,
) -> Json<JobSearchResponse> {
    app_log!(info, "Job search '{}' by {}", request.query, caller(&auth));
    Json(proxies.job_search.handle(&request).await)
}

pub async fn linkedin_posts_handler(
    request: Json<LinkedInPostsRequest>,
    auth: OptionalAuth,
    proxies: &State<Proxies>,
) -> Json<LinkedInPostsResponse> {
    app_log!(
        info,
        "LinkedIn posts for '{}' by {}",
        request.company_username,
        caller(&auth)
    );
    Json(proxies.linkedin.handle(&request).await)
}
