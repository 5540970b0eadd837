use anyhow::{Context, Result};
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

/// Retail schema migrations embedded at build time
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn execute(pool: PgPool) -> Result<()> {
    info!(
        migrations = MIGRATOR.iter().count(),
        "Applying retail schema migrations"
    );

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run retail schema migrations")?;

    println!("✅ Retail schema is up to date");
    for migration in MIGRATOR.iter() {
        println!("   {:04} {}", migration.version, migration.description);
    }
    Ok(())
}
