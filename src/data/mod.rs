//! Retail data access: row types, the store trait, and the shaping helpers
//! that turn raw rows into API payloads

pub mod errors;
pub mod inventory;
pub mod sales;
pub mod store;

// Re-export commonly used types
pub use errors::{DataError, DataResult};
pub use inventory::{recommend_reorders, InventoryPolicy, InventoryRecommendation};
pub use sales::{group_sale_lines, SaleItem, SaleTransaction};
pub use store::PgRetailStore;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Catalog entry from the `products` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub product_id: i32,
    pub product_name: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub unit_price: f64,
    pub sku: Option<String>,
}

/// One joined row of a sale and (at most) one of its line items.
/// Sales without items come back with the item columns set to NULL.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SaleLine {
    pub transaction_id: i32,
    pub transaction_date: NaiveDateTime,
    pub customer_name: Option<String>,
    pub payment_method: Option<String>,
    pub total_amount: f64,
    pub product_name: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price_at_sale: Option<f64>,
}

/// Store-wide sales totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SalesSummary {
    pub total_revenue: f64,
    pub total_products_sold: i64,
    pub total_transactions: i64,
    pub unique_customers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_name: String,
    pub total_quantity_sold: i64,
}

/// Stock position for a product together with its recent sell-through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryLevel {
    pub product_id: i32,
    pub product_name: String,
    pub current_stock: i32,
    pub reorder_level: i32,
    pub unit_price: f64,
    pub units_sold_30d: i64,
}

/// Revenue summed over one calendar day. Days without sales have no row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyRevenue {
    pub sale_date: NaiveDate,
    pub daily_revenue: f64,
}

/// Inclusive date window for the sales listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalesFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SalesFilter {
    /// Parse optional `YYYY-MM-DD` query values. Blank strings count as absent.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> DataResult<Self> {
        let start_date = parse_query_date("start_date", start)?;
        let end_date = parse_query_date("end_date", end)?;

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(DataError::InvalidRange {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }

        Ok(Self { start_date, end_date })
    }
}

fn parse_query_date(field: &str, raw: Option<&str>) -> DataResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| DataError::invalid_date(field, value)),
    }
}

/// Read-only access to the transactional store.
///
/// Every method is a single query; implementations hold a connection only
/// for the duration of that query.
#[async_trait]
pub trait RetailStore: Send + Sync {
    /// Products ordered by id, optionally filtered by a case-insensitive
    /// substring of name, category, brand or SKU
    async fn list_products(&self, search: Option<&str>) -> DataResult<Vec<Product>>;

    /// Sale rows joined with their items, newest transaction first
    async fn list_sale_lines(&self, filter: SalesFilter) -> DataResult<Vec<SaleLine>>;

    async fn sales_summary(&self) -> DataResult<SalesSummary>;

    async fn top_selling_products(&self, limit: i64) -> DataResult<Vec<TopProduct>>;

    async fn inventory_levels(&self) -> DataResult<Vec<InventoryLevel>>;

    /// Calendar date of the most recent transaction, if any
    async fn latest_transaction_date(&self) -> DataResult<Option<NaiveDate>>;

    /// Daily revenue sums in ascending date order
    async fn daily_revenue(&self) -> DataResult<Vec<DailyRevenue>>;

    /// Cheap round trip used by the health endpoint
    async fn ping(&self) -> DataResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sales_filter_parses_both_bounds() {
        let filter = SalesFilter::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap();
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filter.end_date, NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn test_sales_filter_blank_is_absent() {
        let filter = SalesFilter::parse(Some("  "), None).unwrap();
        assert_eq!(filter, SalesFilter::default());
    }

    #[test]
    fn test_sales_filter_rejects_garbage() {
        let err = SalesFilter::parse(Some("01/02/2024"), None).unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { ref field, .. } if field == "start_date"));
    }

    #[test]
    fn test_sales_filter_rejects_inverted_range() {
        let err = SalesFilter::parse(Some("2024-02-01"), Some("2024-01-01")).unwrap_err();
        assert!(matches!(err, DataError::InvalidRange { .. }));
    }
}
