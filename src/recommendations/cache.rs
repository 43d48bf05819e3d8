// src/recommendations/cache.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::types::JobListing;

#[derive(sqlx::FromRow)]
struct CacheRow {
    listings: String,
    expires_at: DateTime<Utc>,
}

/// Per-user listing cache in `recommendation_cache`. One row per user,
/// overwritten on every store.
pub struct RecommendationCache<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RecommendationCache<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Cached listings, only while `expires_at > now`.
    pub async fn get(&self, user_id: &str, now: DateTime<Utc>) -> Result<Option<Vec<JobListing>>> {
        let row = sqlx::query_as::<_, CacheRow>(
            "SELECT listings, expires_at FROM recommendation_cache WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to read recommendation cache")?;

        match row {
            Some(row) if row.expires_at > now => {
                let listings = serde_json::from_str(&row.listings)
                    .context("Corrupt recommendation cache entry")?;
                Ok(Some(listings))
            }
            _ => Ok(None),
        }
    }

    pub async fn put(
        &self,
        user_id: &str,
        listings: &[JobListing],
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let payload = serde_json::to_string(listings)?;
        sqlx::query(
            r#"
            INSERT INTO recommendation_cache (user_id, listings, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                listings = excluded.listings,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(user_id)
        .bind(payload)
        .bind(expires_at)
        .execute(self.pool)
        .await
        .context("Failed to write recommendation cache")?;

        Ok(())
    }

    pub async fn invalidate(&self, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM recommendation_cache WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::types::JobType;
    use chrono::Duration;

    fn listing(id: &str) -> JobListing {
        JobListing {
            id: id.to_string(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            salary: Some("$100k - $120k".to_string()),
            job_type: JobType::FullTime,
            url: "https://example.com/1".to_string(),
            posted: Utc::now(),
            source: "synthetic".to_string(),
            match_score: 88,
        }
    }

    #[tokio::test]
    async fn test_round_trip_before_expiry() {
        let db = Database::in_memory().await.unwrap();
        let cache = RecommendationCache::new(db.pool());
        let now = Utc::now();
        let listings = vec![listing("a"), listing("b")];

        cache
            .put("alice", &listings, now + Duration::minutes(30))
            .await
            .unwrap();

        let hit = cache.get("alice", now + Duration::minutes(29)).await.unwrap();
        assert_eq!(hit, Some(listings));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let db = Database::in_memory().await.unwrap();
        let cache = RecommendationCache::new(db.pool());
        let now = Utc::now();

        cache
            .put("alice", &[listing("a")], now + Duration::minutes(30))
            .await
            .unwrap();

        assert!(cache
            .get("alice", now + Duration::minutes(30))
            .await
            .unwrap()
            .is_none());
        assert!(cache.get("bob", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_and_invalidate_clears() {
        let db = Database::in_memory().await.unwrap();
        let cache = RecommendationCache::new(db.pool());
        let expires = Utc::now() + Duration::minutes(30);

        cache.put("alice", &[listing("a")], expires).await.unwrap();
        cache.put("alice", &[listing("b")], expires).await.unwrap();
        let hit = cache.get("alice", Utc::now()).await.unwrap().unwrap();
        assert_eq!(hit[0].id, "b");

        cache.invalidate("alice").await.unwrap();
        assert!(cache.get("alice", Utc::now()).await.unwrap().is_none());
    }
}
