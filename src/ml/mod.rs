//! Revenue model: feature construction, OLS training, artifact persistence
//! and the prediction interface the forecast path depends on

pub mod artifacts;
pub mod features;
pub mod model;
pub mod trainer;

pub use artifacts::{ArtifactPaths, ModelArtifacts};
pub use features::{days_since_start, feature_matrix};
pub use model::{LinearTrend, PersistedModel};
pub use trainer::{train, TrainingReport};

use ndarray::{Array1, ArrayView2};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MlError {
    #[error("No daily revenue samples available to train on")]
    NoSamples,

    #[error("Model fit failed: {0}")]
    Fit(String),

    #[error("Expected {expected} feature column(s), got {actual}")]
    FeatureShape { expected: usize, actual: usize },

    #[error("Model produced a non-finite prediction")]
    NonFinite,

    #[error("Artifact {path} not found")]
    ArtifactMissing { path: String },

    #[error("Failed to read or write artifact {path}: {source}")]
    ArtifactIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact {path} is malformed: {source}")]
    ArtifactFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A fitted model that maps feature rows to revenue.
///
/// Implementations predict a whole batch at once; rows are samples and
/// columns are features.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>, MlError>;
}
