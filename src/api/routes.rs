use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, AppState};
use crate::data::{
    group_sale_lines, recommend_reorders, InventoryRecommendation, Product, SaleTransaction,
    SalesFilter, SalesSummary, TopProduct,
};
use crate::forecast::{ForecastError, ForecastPoint, Horizon};

/// Number of products in the summary's best-seller list
const TOP_PRODUCTS_LIMIT: i64 = 5;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SalesQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// `days` stays a string so malformed values get our error body rather than
/// the extractor's rejection
#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub days: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(flatten)]
    pub totals: SalesSummary,
    pub top_selling_products: Vec<TopProduct>,
}

pub async fn home() -> &'static str {
    "Welcome to the Smart Retail Analytics Backend API!"
}

#[tracing::instrument(name = "GET /health", skip(state))]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state
        .store
        .ping()
        .await
        .map_err(|e| ApiError::internal("Database unreachable", e))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

#[tracing::instrument(name = "GET /products", skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .store
        .list_products(query.search.as_deref())
        .await
        .map_err(|e| ApiError::from_data(e, "Failed to fetch products"))?;

    Ok(Json(products))
}

#[tracing::instrument(name = "GET /sales", skip(state))]
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<Vec<SaleTransaction>>, ApiError> {
    let filter = SalesFilter::parse(query.start_date.as_deref(), query.end_date.as_deref())
        .map_err(|e| ApiError::from_data(e, "Failed to fetch sales"))?;

    let lines = state
        .store
        .list_sale_lines(filter)
        .await
        .map_err(|e| ApiError::from_data(e, "Failed to fetch sales"))?;

    Ok(Json(group_sale_lines(lines)))
}

#[tracing::instrument(name = "GET /analytics/summary", skip(state))]
pub async fn analytics_summary(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsSummary>, ApiError> {
    let (totals, top_selling_products) = tokio::try_join!(
        state.store.sales_summary(),
        state.store.top_selling_products(TOP_PRODUCTS_LIMIT),
    )
    .map_err(|e| ApiError::from_data(e, "Failed to fetch analytics summary"))?;

    Ok(Json(AnalyticsSummary {
        totals,
        top_selling_products,
    }))
}

#[tracing::instrument(name = "GET /analytics/inventory_recommendations", skip(state))]
pub async fn inventory_recommendations(
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryRecommendation>>, ApiError> {
    let levels = state
        .store
        .inventory_levels()
        .await
        .map_err(|e| ApiError::from_data(e, "Failed to fetch inventory recommendations"))?;

    Ok(Json(recommend_reorders(&levels, state.inventory_policy)))
}

#[tracing::instrument(name = "GET /forecast", skip(state))]
pub async fn forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<Vec<ForecastPoint>>, ApiError> {
    let forecaster = state
        .forecaster
        .as_deref()
        .ok_or(ForecastError::ModelUnavailable)?;
    let horizon = Horizon::parse(query.days.as_deref(), state.horizon_limits)?;

    let points = forecaster.forecast(state.store.as_ref(), horizon).await?;

    info!(days = horizon.days(), "Served revenue forecast");
    Ok(Json(points))
}
