// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use graflog::app_log;
use crate::applications::csv_io::{export_csv, import_csv};
use crate::applications::{ApplicationDataClient, ConsoleNotifier};
use crate::auth::AuthConfig;
use crate::board::{BoardController, DeletionGate};
use crate::core::{ConfigManager, Database};
use crate::profiles::ProfileRepository;
use crate::proxy::JobSearchProxy;
use crate::recommendations::{
    HttpListingsSource, ListingsSource, RecommendationEngine, RecommendationQuery,
};
use crate::session::{Session, SessionContext, SessionState};
use crate::stats::compute_stats;

const SESSION_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "jobtrail")]
#[command(about = "Track job applications through a status board and find new openings")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file
    #[arg(long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Access token of the signed-in user
    #[arg(long, global = true, env = "JOBTRAIL_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "ROCKET_PORT", default_value_t = 8000)]
        port: u16,
    },
    /// Create or upgrade the database schema
    Migrate,
    /// Print the status board
    Board,
    /// Print job recommendations
    Recommend {
        /// Ignore cached results
        #[arg(long)]
        refresh: bool,
    },
    /// Print application statistics
    Stats,
    /// Import applications from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Export applications to a CSV file
    Export {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Issue an access token for a local account
    IssueToken {
        user_id: String,
        email: String,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
}

fn token_ttl(hours: i64) -> Result<chrono::Duration> {
    if hours <= 0 {
        anyhow::bail!("Token lifetime must be positive, got {} hours", hours);
    }
    chrono::Duration::try_hours(hours)
        .with_context(|| format!("Token lifetime of {} hours is out of range", hours))
}

/// Verify the token on a background task and wait for the session holder
/// to settle.
async fn resolve_session(auth: &AuthConfig, token: Option<String>) -> Result<Arc<Session>> {
    let context = Arc::new(SessionContext::new());

    let resolver = {
        let context = Arc::clone(&context);
        let auth = auth.clone();
        tokio::spawn(async move {
            match token.as_deref().map(|t| auth.verify_token(t)) {
                Some(Ok(session)) => context.sign_in(session),
                Some(Err(e)) => {
                    app_log!(warn, "Token rejected: {}", e);
                    context.sign_out();
                }
                None => context.sign_out(),
            }
        })
    };

    let state = context.wait_until_resolved(SESSION_RESOLVE_TIMEOUT).await;
    resolver.await.context("Session resolver task failed")?;

    match state {
        SessionState::SignedIn(session) => Ok(session),
        SessionState::SignedOut => {
            anyhow::bail!("Not signed in. Pass --token or set JOBTRAIL_TOKEN")
        }
        SessionState::Loading => anyhow::bail!("Timed out while checking the session"),
    }
}

async fn open_user_store(
    config: &ConfigManager,
    token: Option<String>,
) -> Result<(Database, Arc<Session>)> {
    let auth = AuthConfig::from_settings(&config.auth)?;
    let session = resolve_session(&auth, token).await?;
    let db = Database::new(&config.environment.database_path).await?;
    Ok((db, session))
}

pub async fn handle_command(cli: Cli, config: ConfigManager) -> Result<()> {
    match cli.command {
        Command::Serve { port } => {
            config.ensure_directories().await?;
            crate::start_web_server(config, port).await?;
        }

        Command::Migrate => {
            Database::new(&config.environment.database_path).await?;
            println!(
                "✅ Database ready: {}",
                config.environment.database_path.display()
            );
        }

        Command::IssueToken {
            user_id,
            email,
            hours,
        } => {
            let auth = AuthConfig::from_settings(&config.auth)?;
            let token = auth.issue_token(&user_id, &email, token_ttl(hours)?)?;
            println!("{}", token);
        }

        Command::Board => {
            let (db, session) = open_user_store(&config, cli.token).await?;
            print_board(&db, &session).await;
        }

        Command::Recommend { refresh } => {
            let (db, session) = open_user_store(&config, cli.token).await?;
            recommend(&config, &db, &session, refresh).await?;
        }

        Command::Stats => {
            let (db, session) = open_user_store(&config, cli.token).await?;
            print_stats(&db, &session).await;
        }

        Command::Import { csv } => {
            let (db, session) = open_user_store(&config, cli.token).await?;
            let content = tokio::fs::read_to_string(&csv)
                .await
                .with_context(|| format!("Failed to read {}", csv.display()))?;
            let summary = import_csv(db.pool(), &session.user_id, &content).await?;
            println!(
                "✅ Imported {} applications ({} skipped)",
                summary.imported, summary.skipped
            );
        }

        Command::Export { csv } => {
            let (db, session) = open_user_store(&config, cli.token).await?;
            let applications = ApplicationDataClient::new(db.pool(), &ConsoleNotifier)
                .fetch(&session)
                .await;
            let content = export_csv(&applications)?;
            tokio::fs::write(&csv, content)
                .await
                .with_context(|| format!("Failed to write {}", csv.display()))?;
            println!(
                "✅ Exported {} applications to {}",
                applications.len(),
                csv.display()
            );
        }
    }

    Ok(())
}

async fn print_board(db: &Database, session: &Session) {
    let gate = DeletionGate::new();
    let board = BoardController::new(db.pool(), &ConsoleNotifier, session, &gate);

    for column in board.refresh().await {
        println!("\n{} ({})", column.title, column.tasks.len());
        println!("{}", "-".repeat(80));
        for task in column.tasks {
            println!(
                "  {:<28} {:<20} {:<13} {:?}{}",
                task.title,
                task.company,
                task.deadline,
                task.priority,
                task.label.map(|l| format!(" [{}]", l)).unwrap_or_default()
            );
        }
    }
}

async fn recommend(
    config: &ConfigManager,
    db: &Database,
    session: &Session,
    refresh: bool,
) -> Result<()> {
    let profile = ProfileRepository::new(db.pool())
        .get_or_create(&session.user_id, &session.email)
        .await?;
    let query = RecommendationQuery::from_profile(&profile);

    let source: Box<dyn ListingsSource> = match config.service.listings_proxy_url.as_deref() {
        Some(url) => Box::new(HttpListingsSource::new(url, config.service.timeout_seconds)?),
        None => {
            let proxy = JobSearchProxy::from_config(&config.service)?;
            if !proxy.is_enabled() {
                app_log!(info, "Recommendations will use synthetic listings only");
            }
            Box::new(proxy)
        }
    };
    let engine = RecommendationEngine::new(db.pool(), source.as_ref(), &config.recommendations);

    let listings = if refresh {
        engine.refresh(session, &query).await
    } else {
        engine.get_recommendations(session, &query).await
    };

    println!(
        "{:<5} {:<32} {:<22} {:<20} Salary",
        "Match", "Title", "Company", "Location"
    );
    println!("{}", "-".repeat(100));
    for listing in listings {
        println!(
            "{:<5} {:<32} {:<22} {:<20} {}",
            listing.match_score,
            listing.title,
            listing.company,
            listing.location,
            listing.salary.unwrap_or_default()
        );
    }
    Ok(())
}

async fn print_stats(db: &Database, session: &Session) {
    let applications = ApplicationDataClient::new(db.pool(), &ConsoleNotifier)
        .fetch(session)
        .await;
    let stats = compute_stats(&applications, chrono::Utc::now());

    println!("Total applications: {}", stats.total);
    println!(
        "Applied {} / Interview {} / Offer {} / Rejected {}",
        stats.by_status.applied,
        stats.by_status.interview,
        stats.by_status.offer,
        stats.by_status.rejected
    );
    println!("Response rate:  {:.1}%", stats.response_rate);
    println!("Interview rate: {:.1}%", stats.interview_rate);
    println!("Offer rate:     {:.1}%", stats.offer_rate);
    println!("Average days active: {:.1}", stats.average_days_active);
    for month in stats.monthly {
        println!("  {}  {}", month.month, "#".repeat(month.count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_import() {
        let cli = Cli::try_parse_from(["jobtrail", "import", "--csv", "apps.csv"]).unwrap();
        assert!(matches!(cli.command, Command::Import { csv } if csv == PathBuf::from("apps.csv")));
    }

    #[test]
    fn test_token_ttl_bounds() {
        assert_eq!(token_ttl(24).unwrap(), chrono::Duration::hours(24));
        assert!(token_ttl(0).is_err());
        assert!(token_ttl(i64::MAX).is_err());
    }

    #[tokio::test]
    async fn test_session_requires_valid_token() {
        let auth = AuthConfig::new("secret", "authenticated");
        assert!(resolve_session(&auth, None).await.is_err());
        assert!(resolve_session(&auth, Some("garbage".to_string())).await.is_err());

        let token = auth
            .issue_token("u1", "u1@example.com", chrono::Duration::hours(1))
            .unwrap();
        let session = resolve_session(&auth, Some(token)).await.unwrap();
        assert_eq!(session.user_id, "u1");
    }
}
