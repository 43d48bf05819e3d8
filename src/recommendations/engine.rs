// src/recommendations/engine.rs
//! Per-user job recommendations: cache, live listings, synthetic fallback.
//!
//! `get_recommendations` never fails. Store, cache and listings-source
//! errors are logged and degrade to the next step.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::cache::RecommendationCache;
use super::keywords::{build_query, extract_keywords};
use super::source::ListingsSource;
use super::synthetic::{self, SyntheticInput};
use graflog::app_log;
use crate::applications::ApplicationRepository;
use crate::core::config_manager::RecommendationSettings;
use crate::profiles::Profile;
use crate::session::Session;
use crate::types::{JobApplication, JobListing, JobSearchRequest, MAX_MATCH_SCORE};

const DEFAULT_COUNTRY: &str = "us";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub roles: Vec<String>,
    pub location: Option<String>,
    pub country: Option<String>,
}

impl RecommendationQuery {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            roles: profile.desired_roles.clone(),
            location: profile.location.clone(),
            country: profile.country.clone(),
        }
    }
}

pub struct RecommendationEngine<'a> {
    pool: &'a SqlitePool,
    source: &'a dyn ListingsSource,
    settings: &'a RecommendationSettings,
    seed: Option<u64>,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(
        pool: &'a SqlitePool,
        source: &'a dyn ListingsSource,
        settings: &'a RecommendationSettings,
    ) -> Self {
        Self {
            pool,
            source,
            settings,
            seed: None,
        }
    }

    /// Fix the synthetic generator's randomness.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub async fn get_recommendations(
        &self,
        session: &Session,
        query: &RecommendationQuery,
    ) -> Vec<JobListing> {
        self.get_recommendations_at(session, query, Utc::now()).await
    }

    /// Drop the cached entry and recompute.
    pub async fn refresh(&self, session: &Session, query: &RecommendationQuery) -> Vec<JobListing> {
        if let Err(e) = RecommendationCache::new(self.pool)
            .invalidate(&session.user_id)
            .await
        {
            app_log!(warn, "Failed to invalidate recommendations: {:#}", e);
        }
        self.get_recommendations(session, query).await
    }

    pub async fn get_recommendations_at(
        &self,
        session: &Session,
        query: &RecommendationQuery,
        now: DateTime<Utc>,
    ) -> Vec<JobListing> {
        let cache = RecommendationCache::new(self.pool);

        match cache.get(&session.user_id, now).await {
            Ok(Some(listings)) => {
                app_log!(debug, "Recommendation cache hit for {}", session.email);
                return listings;
            }
            Ok(None) => {}
            Err(e) => app_log!(warn, "Recommendation cache read failed: {:#}", e),
        }

        let applications = match ApplicationRepository::new(self.pool)
            .list_for_user(&session.user_id)
            .await
        {
            Ok(applications) => applications,
            Err(e) => {
                app_log!(warn, "Could not load applications for recommendations: {:#}", e);
                Vec::new()
            }
        };

        let keywords = extract_keywords(applications.iter().map(|a| a.position.as_str()));
        let search = build_query(&query.roles, &keywords, &self.settings.fallback_query);
        let country = query
            .country
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_COUNTRY);
        let request = JobSearchRequest::new(&search, query.location.as_deref(), Some(country));

        app_log!(info, "Searching listings for {}: {}", session.email, search);

        let listings = match self.source.search(&request).await {
            Ok(listings) if !listings.is_empty() => clamp_scores(listings),
            Ok(_) => {
                app_log!(info, "No listings for '{}', using synthetic results", search);
                self.synthesize(&applications, keywords, query, country, now)
            }
            Err(e) => {
                app_log!(warn, "Listings source failed, using synthetic results: {:#}", e);
                self.synthesize(&applications, keywords, query, country, now)
            }
        };

        match Duration::try_minutes(self.settings.ttl_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl))
        {
            Some(expires_at) => {
                if let Err(e) = cache.put(&session.user_id, &listings, expires_at).await {
                    app_log!(warn, "Failed to cache recommendations: {:#}", e);
                }
            }
            None => app_log!(
                warn,
                "Cache TTL of {} minutes is out of range, not caching",
                self.settings.ttl_minutes
            ),
        }

        listings
    }

    fn synthesize(
        &self,
        applications: &[JobApplication],
        keywords: Vec<String>,
        query: &RecommendationQuery,
        country: &str,
        now: DateTime<Utc>,
    ) -> Vec<JobListing> {
        let input = SyntheticInput {
            roles: query.roles.clone(),
            keywords,
            location: query.location.clone(),
            country: country.to_string(),
            applied_companies: applications
                .iter()
                .map(|a| a.company.to_lowercase())
                .collect(),
            past_positions: applications.iter().map(|a| a.position.clone()).collect(),
            fallback_role: self.settings.fallback_query.clone(),
        };

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        synthetic::generate(&input, &mut rng, now)
    }
}

fn clamp_scores(mut listings: Vec<JobListing>) -> Vec<JobListing> {
    for listing in &mut listings {
        listing.match_score = listing.match_score.min(MAX_MATCH_SCORE);
    }
    listings
}
