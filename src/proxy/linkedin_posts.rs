// src/proxy/linkedin_posts.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

use graflog::app_log;
use crate::core::config_manager::ServiceConfig;
use crate::core::ServiceClient;
use crate::types::{LinkedInPostsRequest, LinkedInPostsResponse, Post};

/// A post counts as a job post when its text mentions any of these.
pub const JOB_KEYWORDS: [&str; 9] = [
    "hiring",
    "job",
    "position",
    "opportunity",
    "career",
    "apply",
    "role",
    "opening",
    "vacancy",
];

#[derive(Debug, Default, Deserialize)]
struct PostsEnvelope {
    #[serde(default)]
    data: Vec<UpstreamPost>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct UpstreamPost {
    urn: Option<String>,
    text: Option<String>,
    post_url: Option<String>,
    posted_at: Option<String>,
    posted_date: Option<String>,
    total_reaction_count: Option<u64>,
    comments_count: Option<u64>,
}

impl From<UpstreamPost> for Post {
    fn from(post: UpstreamPost) -> Self {
        Self {
            id: post.urn.unwrap_or_default(),
            text: post.text.unwrap_or_default(),
            url: post.post_url,
            posted_at: post.posted_date.or(post.posted_at),
            likes: post.total_reaction_count.unwrap_or(0),
            comments: post.comments_count.unwrap_or(0),
        }
    }
}

#[derive(Serialize)]
struct PostsParams<'a> {
    username: &'a str,
    start: u32,
}

pub fn is_job_post(text: &str) -> bool {
    let lower = text.to_lowercase();
    JOB_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

pub fn filter_job_posts(posts: Vec<Post>) -> Vec<Post> {
    posts.into_iter().filter(|p| is_job_post(&p.text)).collect()
}

pub struct LinkedInPostsProxy {
    client: Option<ServiceClient>,
}

impl LinkedInPostsProxy {
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = match config.linkedin_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(ServiceClient::with_api_key(
                &config.linkedin_url,
                config.timeout_seconds,
                key,
                &config.linkedin_host,
            )?),
            _ => {
                app_log!(warn, "LINKEDIN_API_KEY not set, company posts are disabled");
                None
            }
        };
        Ok(Self { client })
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub async fn handle(&self, request: &LinkedInPostsRequest) -> LinkedInPostsResponse {
        match self.fetch(request).await {
            Ok(posts) => LinkedInPostsResponse::success(posts),
            Err(e) => {
                app_log!(
                    error,
                    "LinkedIn posts failed for '{}': {:#}",
                    request.company_username,
                    e
                );
                LinkedInPostsResponse::failure(e.to_string())
            }
        }
    }

    async fn fetch(&self, request: &LinkedInPostsRequest) -> Result<Vec<Post>> {
        let username = request.company_username.trim();
        if username.is_empty() {
            anyhow::bail!("companyUsername is required");
        }
        let Some(client) = &self.client else {
            anyhow::bail!("LinkedIn API key is not configured");
        };

        let params = PostsParams {
            username,
            start: request.start,
        };
        let envelope: PostsEnvelope = client.get_json("/get-company-posts", &params).await?;
        let posts: Vec<Post> = envelope.data.into_iter().map(Post::from).collect();

        let posts = if request.jobs_only {
            filter_job_posts(posts)
        } else {
            posts
        };
        app_log!(info, "Fetched {} posts for {}", posts.len(), username);
        Ok(posts)
    }
}
