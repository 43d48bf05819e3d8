use anyhow::{Context, Result};
use clap::Parser;
use graflog::app_log;
use job_tracker::cli::{handle_command, Cli};
use job_tracker::core::ConfigManager;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigManager::load_from(&cli.config)?;

    let log_path = &config.environment.log_path;
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("job_tracker=info,jobtrail=info,rocket=warn")),
        )
        .init();

    app_log!(
        info,
        "Environment: {}",
        std::env::var("JOBTRAIL_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    );
    app_log!(
        info,
        "Database: {}",
        config.environment.database_path.display()
    );

    handle_command(cli, config).await
}
