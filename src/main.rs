use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use retailcast::cli::{self, Cli};
use retailcast::config::Config;
use retailcast::db::Database;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first
    let config = Config::load()?;

    // Initialize tracing with structured JSON logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "retailcast starting up");

    let db = if cli.command.needs_live_store() {
        let db = Database::new(&config.database).await?;
        db.health_check().await?;
        db
    } else {
        let db = Database::connect_lazy(&config.database)?;
        if let Err(e) = db.health_check().await {
            warn!(error = %e, "Database unreachable at startup, serving anyway");
        }
        db
    };

    info!("Database pool ready");

    cli::run(cli, config, db.pool.clone()).await?;

    db.close().await;
    info!("retailcast completed successfully");
    Ok(())
}
