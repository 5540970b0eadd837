//! HTTP surface: shared state, router and CORS setup

pub mod error;
pub mod routes;

pub use error::{ApiError, ErrorBody};

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{http::HeaderValue, http::Method, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::data::{InventoryPolicy, RetailStore};
use crate::forecast::{Forecaster, HorizonLimits};

/// State shared by every handler. The forecaster is `None` when the model
/// artifacts could not be loaded at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RetailStore>,
    pub forecaster: Option<Arc<Forecaster>>,
    pub horizon_limits: HorizonLimits,
    pub inventory_policy: InventoryPolicy,
}

impl AppState {
    pub fn new(store: Arc<dyn RetailStore>, forecaster: Option<Forecaster>) -> Self {
        Self {
            store,
            forecaster: forecaster.map(Arc::new),
            horizon_limits: HorizonLimits::default(),
            inventory_policy: InventoryPolicy::default(),
        }
    }

    pub fn with_horizon_limits(mut self, limits: HorizonLimits) -> Self {
        self.horizon_limits = limits;
        self
    }

    pub fn with_inventory_policy(mut self, policy: InventoryPolicy) -> Self {
        self.inventory_policy = policy;
        self
    }
}

pub fn construct_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/health", get(routes::health))
        .route("/products", get(routes::list_products))
        .route("/sales", get(routes::list_sales))
        .route("/forecast", get(routes::forecast))
        .route("/analytics/forecast", get(routes::forecast))
        .route("/analytics/summary", get(routes::analytics_summary))
        .route(
            "/analytics/inventory_recommendations",
            get(routes::inventory_recommendations),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin when `allowed_origins` is empty, otherwise exactly those
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(origins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_accepts_listed_origins() {
        let origins = vec!["http://127.0.0.1:8080".to_string()];
        assert!(cors_layer(&origins).is_ok());
        assert!(cors_layer(&[]).is_ok());
    }

    #[test]
    fn test_cors_rejects_bad_origin() {
        let origins = vec!["http://bad\norigin".to_string()];
        assert!(cors_layer(&origins).is_err());
    }
}
