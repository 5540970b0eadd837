use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::config::Config;
use crate::data::{PgRetailStore, RetailStore};
use crate::forecast::{Forecaster, Horizon};
use crate::ml::{self, MlError, ModelArtifacts};

/// Serve the HTTP API until Ctrl-C
pub async fn serve(pool: PgPool, config: Config) -> Result<()> {
    let store: Arc<dyn RetailStore> = Arc::new(PgRetailStore::new(pool));

    let paths = config.forecast.artifact_paths();
    let forecaster = match Forecaster::load(&paths) {
        Ok(forecaster) => Some(forecaster),
        Err(e) => {
            warn!(
                error = %e,
                "Forecast model not loaded, /forecast will report it unavailable"
            );
            None
        }
    };

    let state = AppState::new(store, forecaster)
        .with_horizon_limits(config.forecast.horizon_limits())
        .with_inventory_policy(config.inventory.policy());

    let app = api::construct_router(state)
        .layer(api::cors_layer(&config.server.cors_allowed_origins)?);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await
        .context("API server failed")?;

    Ok(())
}

/// Train on all daily revenue and persist the model artifacts
pub async fn train(pool: PgPool, config: Config) -> Result<()> {
    let store = PgRetailStore::new(pool);
    let samples = store
        .daily_revenue()
        .await
        .context("Failed to fetch daily revenue for training")?;

    let report = match ml::train(&samples) {
        Ok(report) => report,
        Err(MlError::NoSamples) => {
            warn!("No sales data available to train the model");
            println!("⚠️  No sales data available to train the model. Nothing written.");
            return Ok(());
        }
        Err(e) => return Err(e).context("Model training failed"),
    };

    let paths = config.forecast.artifact_paths();
    ModelArtifacts::from_report(&report)
        .save(&paths)
        .context("Failed to save model artifacts")?;

    println!("\n✅ Sales forecast model trained");
    println!("   Samples:        {} days", report.samples);
    println!("   Reference date: {}", report.reference_date);
    println!(
        "   Trend:          revenue = {:.4} * days + {:.4}",
        report.model.slope, report.model.intercept
    );
    println!("   In-sample MSE:  {:.4}", report.mse);
    println!("   In-sample R²:   {:.4}", report.r_squared);
    println!("   Model:          {}", paths.model.display());
    println!("   Reference:      {}", paths.reference_date.display());

    Ok(())
}

/// Print a forecast from the saved artifacts
pub async fn forecast(pool: PgPool, config: Config, days: Option<String>) -> Result<()> {
    let horizon = Horizon::parse(days.as_deref(), config.forecast.horizon_limits())?;

    let forecaster = Forecaster::load(&config.forecast.artifact_paths())
        .context("Forecast model unavailable; run `retailcast train` first")?;

    let store = PgRetailStore::new(pool);
    let points = forecaster.forecast(&store, horizon).await?;

    println!("\n📈 Revenue forecast ({} days)", horizon.days());
    println!("   {:<12} {:>14}", "Date", "Revenue");
    for point in &points {
        println!("   {:<12} {:>14.2}", point.date.to_string(), point.predicted_revenue);
    }

    Ok(())
}
