use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;

pub mod commands;
pub mod migrate;

#[derive(Parser)]
#[command(
    name = "retailcast",
    about = "Retail analytics API with daily revenue forecasting",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve,

    /// Fit the revenue trend on all sales history and write the model artifacts
    Train,

    /// Print a revenue forecast using the saved model artifacts
    Forecast {
        /// Number of days to forecast
        #[arg(short, long)]
        days: Option<String>,
    },

    /// Run database migrations
    Migrate,
}

impl Commands {
    /// Whether the command must fail fast when the database is unreachable.
    /// `serve` starts anyway and reports store outages per request.
    pub fn needs_live_store(&self) -> bool {
        !matches!(self, Commands::Serve)
    }
}

/// Execute CLI command with database pool
pub async fn run(cli: Cli, config: Config, pool: PgPool) -> Result<()> {
    match cli.command {
        Commands::Serve => {
            info!("Starting API server on {}", config.server.bind_address());
            commands::serve(pool, config).await?;
        }
        Commands::Train => {
            info!("Training revenue forecast model");
            commands::train(pool, config).await?;
        }
        Commands::Forecast { days } => {
            info!("Generating revenue forecast");
            commands::forecast(pool, config, days).await?;
        }
        Commands::Migrate => {
            migrate::execute(pool).await?;
        }
    }
    Ok(())
}
