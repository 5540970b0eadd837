// Postgres-backed retail store
// Each query checks a connection out of the pool and returns it on drop

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::debug;

use super::{
    DailyRevenue, DataResult, InventoryLevel, Product, RetailStore, SaleLine, SalesFilter,
    SalesSummary, TopProduct,
};

#[derive(Clone)]
pub struct PgRetailStore {
    pool: PgPool,
}

impl PgRetailStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Wrap a user search term for ILIKE, escaping its wildcards
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl RetailStore for PgRetailStore {
    async fn list_products(&self, search: Option<&str>) -> DataResult<Vec<Product>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let mut conn = self.pool.acquire().await?;
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                product_id,
                product_name,
                category,
                brand,
                unit_price::float8 AS unit_price,
                sku
            FROM products
            WHERE $1::text IS NULL
                OR product_name ILIKE $1
                OR category ILIKE $1
                OR brand ILIKE $1
                OR sku ILIKE $1
            ORDER BY product_id
            "#,
        )
        .bind(pattern)
        .fetch_all(&mut *conn)
        .await?;

        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    async fn list_sale_lines(&self, filter: SalesFilter) -> DataResult<Vec<SaleLine>> {
        let mut conn = self.pool.acquire().await?;
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT
                s.transaction_id,
                s.transaction_date,
                NULLIF(TRIM(CONCAT(c.first_name, ' ', c.last_name)), '') AS customer_name,
                s.payment_method,
                s.total_amount::float8 AS total_amount,
                p.product_name,
                si.quantity,
                si.unit_price_at_sale::float8 AS unit_price_at_sale
            FROM sales s
            LEFT JOIN customers c ON c.customer_id = s.customer_id
            LEFT JOIN sale_items si ON si.transaction_id = s.transaction_id
            LEFT JOIN products p ON p.product_id = si.product_id
            WHERE ($1::date IS NULL OR s.transaction_date >= $1::date)
                AND ($2::date IS NULL OR s.transaction_date < $2::date + 1)
            ORDER BY s.transaction_date DESC, s.transaction_id DESC, si.sale_item_id
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&mut *conn)
        .await?;

        debug!(rows = lines.len(), "Fetched sale lines");
        Ok(lines)
    }

    async fn sales_summary(&self) -> DataResult<SalesSummary> {
        let mut conn = self.pool.acquire().await?;
        let summary = sqlx::query_as::<_, SalesSummary>(
            r#"
            SELECT
                COALESCE(SUM(total_amount), 0)::float8 AS total_revenue,
                (SELECT COALESCE(SUM(quantity), 0) FROM sale_items)::int8 AS total_products_sold,
                COUNT(*)::int8 AS total_transactions,
                COUNT(DISTINCT customer_id)::int8 AS unique_customers
            FROM sales
            "#,
        )
        .fetch_one(&mut *conn)
        .await?;

        Ok(summary)
    }

    async fn top_selling_products(&self, limit: i64) -> DataResult<Vec<TopProduct>> {
        let mut conn = self.pool.acquire().await?;
        let top = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT
                p.product_name,
                SUM(si.quantity)::int8 AS total_quantity_sold
            FROM sale_items si
            JOIN products p ON p.product_id = si.product_id
            GROUP BY p.product_id, p.product_name
            ORDER BY total_quantity_sold DESC, p.product_name
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        Ok(top)
    }

    async fn inventory_levels(&self) -> DataResult<Vec<InventoryLevel>> {
        // Sell-through is measured against the latest sale, not the wall clock,
        // so historical datasets still produce a velocity
        let mut conn = self.pool.acquire().await?;
        let levels = sqlx::query_as::<_, InventoryLevel>(
            r#"
            SELECT
                p.product_id,
                p.product_name,
                i.current_stock,
                i.reorder_level,
                p.unit_price::float8 AS unit_price,
                COALESCE((
                    SELECT SUM(si.quantity)
                    FROM sale_items si
                    JOIN sales s ON s.transaction_id = si.transaction_id
                    WHERE si.product_id = p.product_id
                        AND s.transaction_date >=
                            (SELECT MAX(transaction_date) FROM sales) - INTERVAL '30 days'
                ), 0)::int8 AS units_sold_30d
            FROM inventory i
            JOIN products p ON p.product_id = i.product_id
            ORDER BY p.product_id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(levels)
    }

    async fn latest_transaction_date(&self) -> DataResult<Option<NaiveDate>> {
        let mut conn = self.pool.acquire().await?;
        let latest: Option<NaiveDate> =
            sqlx::query_scalar("SELECT MAX(transaction_date)::date FROM sales")
                .fetch_one(&mut *conn)
                .await?;

        Ok(latest)
    }

    async fn daily_revenue(&self) -> DataResult<Vec<DailyRevenue>> {
        let mut conn = self.pool.acquire().await?;
        let samples = sqlx::query_as::<_, DailyRevenue>(
            r#"
            SELECT
                transaction_date::date AS sale_date,
                SUM(total_amount)::float8 AS daily_revenue
            FROM sales
            GROUP BY transaction_date::date
            ORDER BY sale_date
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        debug!(days = samples.len(), "Aggregated daily revenue");
        Ok(samples)
    }

    async fn ping(&self) -> DataResult<()> {
        // persistent(false) keeps this working behind pgBouncer
        sqlx::query("SELECT 1")
            .persistent(false)
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("milk"), "%milk%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
