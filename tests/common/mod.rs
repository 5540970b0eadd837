// In-memory store shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::atomic::{AtomicUsize, Ordering};

use retailcast::data::{
    DailyRevenue, DataError, DataResult, InventoryLevel, Product, RetailStore, SaleLine,
    SalesFilter, SalesSummary, TopProduct,
};

#[derive(Default)]
pub struct MemoryStore {
    pub products: Vec<Product>,
    pub sale_lines: Vec<SaleLine>,
    pub summary: SalesSummary,
    pub top_products: Vec<TopProduct>,
    pub inventory: Vec<InventoryLevel>,
    pub latest_date: Option<NaiveDate>,
    pub daily: Vec<DailyRevenue>,
    /// Make `latest_transaction_date` fail
    pub latest_date_offline: bool,
    /// Make every query fail
    pub offline: bool,
    pub latest_date_calls: AtomicUsize,
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn at_noon(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(12, 0, 0).expect("valid time")
}

pub fn product(id: i32, name: &str, category: &str, price: f64) -> Product {
    Product {
        product_id: id,
        product_name: name.to_string(),
        category: Some(category.to_string()),
        brand: Some("Acme".to_string()),
        unit_price: price,
        sku: Some(format!("SKU-{:04}", id)),
    }
}

impl MemoryStore {
    pub fn with_products() -> Self {
        Self {
            products: vec![
                product(1, "Whole Milk", "Dairy", 1.99),
                product(2, "Sourdough Bread", "Bakery", 4.50),
                product(3, "Greek Yogurt", "Dairy", 0.89),
            ],
            ..Self::default()
        }
    }

    fn check_online(&self) -> DataResult<()> {
        if self.offline {
            Err(DataError::Internal("store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RetailStore for MemoryStore {
    async fn list_products(&self, search: Option<&str>) -> DataResult<Vec<Product>> {
        self.check_online()?;
        let needle = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());
        Ok(self
            .products
            .iter()
            .filter(|p| match &needle {
                None => true,
                Some(n) => {
                    p.product_name.to_lowercase().contains(n)
                        || p.category.as_deref().unwrap_or("").to_lowercase().contains(n)
                }
            })
            .cloned()
            .collect())
    }

    async fn list_sale_lines(&self, filter: SalesFilter) -> DataResult<Vec<SaleLine>> {
        self.check_online()?;
        Ok(self
            .sale_lines
            .iter()
            .filter(|l| {
                let day = l.transaction_date.date();
                filter.start_date.map_or(true, |s| day >= s)
                    && filter.end_date.map_or(true, |e| day <= e)
            })
            .cloned()
            .collect())
    }

    async fn sales_summary(&self) -> DataResult<SalesSummary> {
        self.check_online()?;
        Ok(self.summary.clone())
    }

    async fn top_selling_products(&self, limit: i64) -> DataResult<Vec<TopProduct>> {
        self.check_online()?;
        Ok(self.top_products.iter().take(limit as usize).cloned().collect())
    }

    async fn inventory_levels(&self) -> DataResult<Vec<InventoryLevel>> {
        self.check_online()?;
        Ok(self.inventory.clone())
    }

    async fn latest_transaction_date(&self) -> DataResult<Option<NaiveDate>> {
        self.latest_date_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        if self.latest_date_offline {
            return Err(DataError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.latest_date)
    }

    async fn daily_revenue(&self) -> DataResult<Vec<DailyRevenue>> {
        self.check_online()?;
        Ok(self.daily.clone())
    }

    async fn ping(&self) -> DataResult<()> {
        self.check_online()
    }
}
