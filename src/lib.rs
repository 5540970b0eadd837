// retailcast - Retail Analytics API
// Serves product, sales and inventory data from Postgres and projects daily
// revenue with a linear trend trained offline on sales history.

#![deny(clippy::unwrap_used)]

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod db;
pub mod forecast;
pub mod ml;

// Re-export commonly used items
pub use config::Config;
pub use data::{PgRetailStore, RetailStore};
pub use forecast::{ForecastPoint, Forecaster, Horizon};
