use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::data::InventoryPolicy;
use crate::forecast::HorizonLimits;
use crate::ml::ArtifactPaths;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub forecast: ForecastConfig,
    pub inventory: InventoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub model_dir: PathBuf,
    pub default_days: u32,
    pub max_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    pub cover_days: u32,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ForecastConfig {
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.model_dir)
    }

    pub fn horizon_limits(&self) -> HorizonLimits {
        HorizonLimits {
            default_days: self.default_days,
            max_days: self.max_days,
        }
    }
}

impl InventoryConfig {
    pub fn policy(&self) -> InventoryPolicy {
        InventoryPolicy {
            cover_days: self.cover_days,
        }
    }
}

/// Read `key` through `lookup`, falling back to `default`, and parse it
fn var_or<T, F>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .parse()
        .with_context(|| format!("Invalid {} value", key))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load from the process environment after applying `.env`
    pub fn load() -> Result<Self> {
        // Load .env file - this sets env vars that aren't already set
        dotenv::dotenv().ok();

        Self::from_env_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_env_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database configuration - DATABASE_URL is required
        let database_url = lookup("DATABASE_URL")
            .context("DATABASE_URL environment variable is required but not set")?;

        let config = Config {
            database: DatabaseConfig {
                url: database_url,
                max_connections: var_or(&lookup, "DB_MAX_CONNECTIONS", "5")?,
                min_connections: var_or(&lookup, "DB_MIN_CONNECTIONS", "1")?,
            },
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
                port: var_or(&lookup, "SERVER_PORT", "5000")?,
                cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .map(|raw| parse_origins(&raw))
                    .unwrap_or_default(),
            },
            forecast: ForecastConfig {
                model_dir: PathBuf::from(
                    lookup("MODEL_DIR").unwrap_or_else(|| "ml_models".to_string()),
                ),
                default_days: var_or(&lookup, "FORECAST_DEFAULT_DAYS", "7")?,
                max_days: var_or(&lookup, "FORECAST_MAX_DAYS", "3650")?,
            },
            inventory: InventoryConfig {
                cover_days: var_or(&lookup, "INVENTORY_COVER_DAYS", "14")?,
            },
        };

        if config.forecast.default_days == 0 {
            anyhow::bail!("FORECAST_DEFAULT_DAYS must be at least 1");
        }
        if config.forecast.default_days > config.forecast.max_days {
            anyhow::bail!(
                "FORECAST_DEFAULT_DAYS ({}) exceeds FORECAST_MAX_DAYS ({})",
                config.forecast.default_days,
                config.forecast.max_days
            );
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/retailcast".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                cors_allowed_origins: Vec::new(),
            },
            forecast: ForecastConfig {
                model_dir: PathBuf::from("ml_models"),
                default_days: 7,
                max_days: 3650,
            },
            inventory: InventoryConfig { cover_days: 14 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_drops_blanks() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_default_config_matches_documented_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind_address(), "127.0.0.1:5000");
        assert_eq!(config.forecast.horizon_limits(), HorizonLimits::default());
        assert_eq!(config.inventory.policy(), InventoryPolicy::default());
        assert!(config
            .forecast
            .artifact_paths()
            .model
            .ends_with("sales_forecast_model.json"));
    }

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_missing_database_url_is_an_error() {
        let err = Config::from_env_vars(|_| None).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("database_url"));
    }

    #[test]
    fn test_only_database_url_gives_defaults() {
        let config = Config::from_env_vars(vars(&[("DATABASE_URL", "postgresql://db/shop")])).unwrap();

        assert_eq!(config.database.url, "postgresql://db/shop");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.server.bind_address(), "127.0.0.1:5000");
        assert!(config.server.cors_allowed_origins.is_empty());
        assert_eq!(config.forecast.horizon_limits(), HorizonLimits::default());
        assert_eq!(config.inventory.cover_days, 14);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_env_vars(vars(&[
            ("DATABASE_URL", "postgresql://db/shop"),
            ("SERVER_PORT", "8080"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test,http://b.test"),
            ("MODEL_DIR", "/var/lib/models"),
            ("FORECAST_MAX_DAYS", "90"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors_allowed_origins.len(), 2);
        assert_eq!(config.forecast.model_dir, PathBuf::from("/var/lib/models"));
        assert_eq!(config.forecast.max_days, 90);
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let err = Config::from_env_vars(vars(&[
            ("DATABASE_URL", "postgresql://db/shop"),
            ("SERVER_PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));
    }

    #[test]
    fn test_default_days_must_fit_under_max() {
        let err = Config::from_env_vars(vars(&[
            ("DATABASE_URL", "postgresql://db/shop"),
            ("FORECAST_DEFAULT_DAYS", "30"),
            ("FORECAST_MAX_DAYS", "10"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("FORECAST_MAX_DAYS"));

        let err = Config::from_env_vars(vars(&[
            ("DATABASE_URL", "postgresql://db/shop"),
            ("FORECAST_DEFAULT_DAYS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }
}
