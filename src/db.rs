use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

pub struct Database {
    pub pool: PgPool,
}

fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions> {
    Ok(PgConnectOptions::from_str(&config.url)
        .context("Failed to parse DATABASE_URL")?
        // Statement caching breaks behind transaction-mode poolers
        .statement_cache_capacity(0))
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to PostgreSQL database");

        let pool = pool_options(config)
            .connect_with(connect_options(config)?)
            .await
            .context("Failed to connect to PostgreSQL database. Check that DATABASE_URL is set correctly.")?;

        info!("Database connection established successfully");
        Ok(Database { pool })
    }

    /// Build the pool without opening a connection. Connections are made on
    /// first use, so the server can start while the database is down.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        info!("Creating lazy PostgreSQL connection pool");

        let pool = pool_options(config).connect_lazy_with(connect_options(config)?);
        Ok(Database { pool })
    }

    /// Perform a health check on the database connection
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .persistent(false)
            .fetch_one(&self.pool)
            .await
            .context("Database health check failed")?;

        info!("Database health check passed");
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }
}
