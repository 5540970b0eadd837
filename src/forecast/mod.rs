//! Daily revenue forecasting over a loaded model
//!
//! A [`Forecaster`] is built once at startup from the persisted artifacts and
//! shared read-only between requests. Each forecast resolves an anchor date
//! from the store, projects the following `horizon` calendar days through the
//! model in one batch, and floors the results at zero.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::RetailStore;
use crate::ml::{feature_matrix, ArtifactPaths, MlError, ModelArtifacts, Predictor};

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Forecast model unavailable")]
    ModelUnavailable,

    #[error("Invalid days parameter '{value}': {reason}")]
    InvalidHorizon { value: String, reason: String },

    #[error("Forecast date out of range after {anchor} + {horizon} days")]
    DateOutOfRange { anchor: NaiveDate, horizon: u32 },

    #[error("Prediction failed: {0}")]
    Prediction(#[from] MlError),
}

/// Bounds applied when parsing a requested horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonLimits {
    pub default_days: u32,
    pub max_days: u32,
}

impl Default for HorizonLimits {
    fn default() -> Self {
        Self {
            default_days: 7,
            max_days: 3650,
        }
    }
}

/// Number of days to forecast, always at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon(u32);

impl Horizon {
    pub fn new(days: u32) -> Option<Self> {
        (days > 0).then_some(Self(days))
    }

    /// Parse a raw query value. Absent means the default; anything that is
    /// not a strictly positive integer within the limit is rejected.
    pub fn parse(raw: Option<&str>, limits: HorizonLimits) -> Result<Self, ForecastError> {
        let Some(raw) = raw else {
            return Ok(Self(limits.default_days.max(1)));
        };

        let invalid = |reason: &str| ForecastError::InvalidHorizon {
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let days: i64 = raw
            .trim()
            .parse()
            .map_err(|_| invalid("must be a positive integer"))?;

        if days <= 0 {
            return Err(invalid("must be a positive integer"));
        }
        if days > limits.max_days as i64 {
            return Err(invalid(&format!(
                "exceeds the server limit of {} days (FORECAST_MAX_DAYS)",
                limits.max_days
            )));
        }

        Ok(Self(days as u32))
    }

    pub fn days(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_revenue: f64,
}

/// Immutable model plus the reference date its features are measured from
#[derive(Clone)]
pub struct Forecaster {
    predictor: Arc<dyn Predictor>,
    reference_date: NaiveDate,
}

impl std::fmt::Debug for Forecaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forecaster")
            .field("reference_date", &self.reference_date)
            .finish_non_exhaustive()
    }
}

impl Forecaster {
    pub fn new(predictor: Arc<dyn Predictor>, reference_date: NaiveDate) -> Self {
        Self {
            predictor,
            reference_date,
        }
    }

    pub fn from_artifacts(artifacts: ModelArtifacts) -> Self {
        Self::new(artifacts.model.into_predictor(), artifacts.reference_date)
    }

    /// Load both artifacts from disk
    pub fn load(paths: &ArtifactPaths) -> Result<Self, MlError> {
        let artifacts = ModelArtifacts::load(paths)?;
        info!(
            reference_date = %artifacts.reference_date,
            model = %paths.model.display(),
            "Loaded forecast model"
        );
        Ok(Self::from_artifacts(artifacts))
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Latest transaction date, or the reference date if the store has
    /// nothing or cannot be reached
    pub async fn resolve_anchor(&self, store: &dyn RetailStore) -> NaiveDate {
        match store.latest_transaction_date().await {
            Ok(Some(latest)) => latest,
            Ok(None) => {
                warn!(
                    reference_date = %self.reference_date,
                    "No transactions found, anchoring forecast at reference date"
                );
                self.reference_date
            }
            Err(e) => {
                warn!(
                    error = %e,
                    reference_date = %self.reference_date,
                    "Latest transaction lookup failed, anchoring forecast at reference date"
                );
                self.reference_date
            }
        }
    }

    /// Forecast the `horizon` days following the store's latest transaction
    pub async fn forecast(
        &self,
        store: &dyn RetailStore,
        horizon: Horizon,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let anchor = self.resolve_anchor(store).await;
        self.forecast_from(anchor, horizon)
    }

    /// Forecast `anchor + 1 ..= anchor + horizon`, one point per day
    pub fn forecast_from(
        &self,
        anchor: NaiveDate,
        horizon: Horizon,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let dates = (1..=horizon.days() as u64)
            .map(|offset| anchor.checked_add_days(Days::new(offset)))
            .collect::<Option<Vec<NaiveDate>>>()
            .ok_or(ForecastError::DateOutOfRange {
                anchor,
                horizon: horizon.days(),
            })?;

        let features = feature_matrix(&dates, self.reference_date);
        let predictions = self.predictor.predict(features.view())?;

        if predictions.len() != dates.len() {
            return Err(ForecastError::Prediction(MlError::FeatureShape {
                expected: dates.len(),
                actual: predictions.len(),
            }));
        }

        debug!(
            anchor = %anchor,
            days = horizon.days(),
            "Projected daily revenue"
        );

        Ok(dates
            .into_iter()
            .zip(predictions.iter())
            .map(|(date, &revenue)| ForecastPoint {
                date,
                predicted_revenue: revenue.max(0.0),
            })
            .collect())
    }
}
