// src/core/config_manager.rs
//! Unified configuration: `config.yaml` sections plus environment overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub service: ServiceConfig,
    pub auth: AuthSettings,
    pub recommendations: RecommendationSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub log_path: PathBuf,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/jobtrail.db"),
            log_path: PathBuf::from("/tmp/jobtrail.log"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the external job-search API.
    pub job_search_url: String,
    pub job_search_host: String,
    pub job_search_api_key: Option<String>,
    /// Base URL of the external LinkedIn data API.
    pub linkedin_url: String,
    pub linkedin_host: String,
    pub linkedin_api_key: Option<String>,
    /// When set, recommendations go through a remote listings proxy instead
    /// of the in-process one.
    pub listings_proxy_url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            job_search_url: "https://jsearch.p.rapidapi.com".to_string(),
            job_search_host: "jsearch.p.rapidapi.com".to_string(),
            job_search_api_key: None,
            linkedin_url: "https://linkedin-data-api.p.rapidapi.com".to_string(),
            linkedin_host: "linkedin-data-api.p.rapidapi.com".to_string(),
            linkedin_api_key: None,
            listings_proxy_url: None,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub audience: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            audience: "authenticated".to_string(),
        }
    }
}

/// Longest accepted recommendation cache lifetime (one week).
pub const MAX_TTL_MINUTES: i64 = 10_080;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecommendationSettings {
    pub ttl_minutes: i64,
    pub fallback_query: String,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            fallback_query: "software engineer".to_string(),
        }
    }
}

impl RecommendationSettings {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TTL_MINUTES).contains(&self.ttl_minutes) {
            anyhow::bail!(
                "recommendations.ttl_minutes must be between 1 and {}, got {}",
                MAX_TTL_MINUTES,
                self.ttl_minutes
            );
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: ConfigManager,
    #[serde(default)]
    production: ConfigManager,
}

impl ConfigManager {
    /// Load `config_path` (if present) and apply environment overrides.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_yaml(&content, &environment)?
        } else {
            info!(
                "{} not found, using built-in defaults",
                config_path.display()
            );
            Self::default()
        };

        config.apply_env_overrides();
        config.recommendations.validate()?;
        config.environment.database_path = resolve_path(&config.environment.database_path)?;
        Ok(config)
    }

    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    fn get_environment() -> String {
        std::env::var("JOBTRAIL_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("JOBTRAIL_DATABASE_PATH") {
            self.environment.database_path = PathBuf::from(path);
        }
        if let Ok(secret) = std::env::var("JOBTRAIL_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(key) = std::env::var("JOB_SEARCH_API_KEY") {
            self.service.job_search_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("LINKEDIN_API_KEY") {
            self.service.linkedin_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("LISTINGS_PROXY_URL") {
            self.service.listings_proxy_url = Some(url);
        }
    }

    /// Ensure the database parent directory exists
    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(db_parent) = self.environment.database_path.parent() {
            tokio::fs::create_dir_all(db_parent)
                .await
                .with_context(|| {
                    format!(
                        "Failed to create database directory: {}",
                        db_parent.display()
                    )
                })?;
        }
        Ok(())
    }
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
local:
  environment:
    database_path: data/local.db
  recommendations:
    ttl_minutes: 10
production:
  environment:
    database_path: /app/data/jobtrail.db
  service:
    timeout_seconds: 5
"#;

    #[test]
    fn test_selects_section_by_environment() {
        let local = ConfigManager::from_yaml(SAMPLE, "local").unwrap();
        assert_eq!(local.environment.database_path, PathBuf::from("data/local.db"));
        assert_eq!(local.recommendations.ttl_minutes, 10);

        let production = ConfigManager::from_yaml(SAMPLE, "production").unwrap();
        assert_eq!(
            production.environment.database_path,
            PathBuf::from("/app/data/jobtrail.db")
        );
        assert_eq!(production.service.timeout_seconds, 5);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let config = ConfigManager::from_yaml("local: {}", "local").unwrap();
        assert_eq!(config.recommendations.ttl_minutes, 30);
        assert_eq!(config.auth.audience, "authenticated");
        assert_eq!(config.recommendations.fallback_query, "software engineer");
    }

    #[test]
    fn test_ttl_must_be_within_a_week() {
        let mut settings = RecommendationSettings::default();
        assert!(settings.validate().is_ok());

        for bad in [0, -5, MAX_TTL_MINUTES + 1, i64::MAX / 1000] {
            settings.ttl_minutes = bad;
            assert!(settings.validate().is_err(), "ttl {} accepted", bad);
        }
        settings.ttl_minutes = MAX_TTL_MINUTES;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_out_of_range_ttl() {
        let path = std::env::temp_dir().join(format!("jobtrail-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "local:\n  recommendations:\n    ttl_minutes: 9223372036854775\n\
             production:\n  recommendations:\n    ttl_minutes: 9223372036854775\n",
        )
        .unwrap();

        let result = ConfigManager::load_from(&path);
        std::fs::remove_file(&path).unwrap();

        let error = result.unwrap_err().to_string();
        assert!(error.contains("ttl_minutes"), "{}", error);
    }
}
