// src/profiles.rs
//! User profiles: display data plus the search preferences used for
//! recommendations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use graflog::app_log;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub desired_roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: String,
    email: String,
    full_name: Option<String>,
    headline: Option<String>,
    location: Option<String>,
    country: Option<String>,
    desired_roles: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = anyhow::Error;

    fn try_from(row: ProfileRow) -> Result<Self> {
        let desired_roles = serde_json::from_str(&row.desired_roles)
            .with_context(|| format!("Corrupt desired_roles for profile {}", row.id))?;
        Ok(Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            headline: row.headline,
            location: row.location,
            country: row.country,
            desired_roles,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Partial profile edit; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub desired_roles: Option<Vec<String>>,
}

pub struct ProfileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, email, full_name, headline, location, country, desired_roles,
                   created_at, updated_at
            FROM profiles
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    /// Return the user's profile, creating an empty one on first sign-in.
    pub async fn get_or_create(&self, user_id: &str, email: &str) -> Result<Profile> {
        if let Some(profile) = self.find(user_id).await? {
            return Ok(profile);
        }

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, desired_roles, created_at, updated_at)
            VALUES (?, ?, '[]', ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        app_log!(info, "Created profile for new user: {}", email);

        self.find(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Profile {} missing after insert", user_id))
    }

    pub async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<Option<Profile>> {
        let Some(mut profile) = self.find(user_id).await? else {
            return Ok(None);
        };

        if let Some(full_name) = update.full_name {
            profile.full_name = non_empty(full_name);
        }
        if let Some(headline) = update.headline {
            profile.headline = non_empty(headline);
        }
        if let Some(location) = update.location {
            profile.location = non_empty(location);
        }
        if let Some(country) = update.country {
            profile.country = non_empty(country.to_lowercase());
        }
        if let Some(roles) = update.desired_roles {
            profile.desired_roles = roles
                .into_iter()
                .map(|role| role.trim().to_string())
                .filter(|role| !role.is_empty())
                .collect();
        }
        profile.updated_at = Utc::now();

        let roles_json = serde_json::to_string(&profile.desired_roles)?;
        sqlx::query(
            r#"
            UPDATE profiles
            SET full_name = ?, headline = ?, location = ?, country = ?,
                desired_roles = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.full_name)
        .bind(&profile.headline)
        .bind(&profile.location)
        .bind(&profile.country)
        .bind(roles_json)
        .bind(profile.updated_at)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(Some(profile))
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
