use std::sync::Arc;

use chrono::{DateTime, Utc};
use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::{MlError, Predictor};

/// `revenue = slope * days_since_start + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }
}

impl Predictor for LinearTrend {
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>, MlError> {
        if features.ncols() != 1 {
            return Err(MlError::FeatureShape {
                expected: 1,
                actual: features.ncols(),
            });
        }

        let predictions = features
            .column(0)
            .mapv(|days| self.slope * days + self.intercept);

        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(MlError::NonFinite);
        }

        Ok(predictions)
    }
}

/// On-disk form of a fitted model. The `kind` tag selects the predictor
/// implementation at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PersistedModel {
    LinearTrend {
        slope: f64,
        intercept: f64,
        samples: usize,
        trained_at: DateTime<Utc>,
    },
}

impl PersistedModel {
    pub fn linear_trend(trend: LinearTrend, samples: usize) -> Self {
        PersistedModel::LinearTrend {
            slope: trend.slope,
            intercept: trend.intercept,
            samples,
            trained_at: Utc::now(),
        }
    }

    pub fn into_predictor(self) -> Arc<dyn Predictor> {
        match self {
            PersistedModel::LinearTrend {
                slope, intercept, ..
            } => Arc::new(LinearTrend::new(slope, intercept)),
        }
    }
}
