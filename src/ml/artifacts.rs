// Model artifact persistence
// The fitted model and the reference date live in two separate JSON files

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use super::{MlError, PersistedModel, TrainingReport};

pub const MODEL_FILE: &str = "sales_forecast_model.json";
pub const REFERENCE_DATE_FILE: &str = "min_sale_date.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub reference_date: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE),
            reference_date: dir.join(REFERENCE_DATE_FILE),
        }
    }
}

/// A fitted model paired with the date its features are measured from
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    pub model: PersistedModel,
    pub reference_date: NaiveDate,
}

impl ModelArtifacts {
    pub fn from_report(report: &TrainingReport) -> Self {
        Self {
            model: PersistedModel::linear_trend(report.model, report.samples),
            reference_date: report.reference_date,
        }
    }

    /// Write both files, creating their directories as needed
    pub fn save(&self, paths: &ArtifactPaths) -> Result<(), MlError> {
        write_json(&paths.model, &self.model)?;
        write_json(&paths.reference_date, &self.reference_date)?;

        info!(
            model = %paths.model.display(),
            reference_date = %paths.reference_date.display(),
            "Saved model artifacts"
        );
        Ok(())
    }

    /// Read both files. Either one missing is an error.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, MlError> {
        let model: PersistedModel = read_json(&paths.model)?;
        let reference_date: NaiveDate = read_json(&paths.reference_date)?;

        Ok(Self {
            model,
            reference_date,
        })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), MlError> {
    let io_err = |source| MlError::ArtifactIo {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_vec_pretty(value).map_err(|source| MlError::ArtifactFormat {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json).map_err(io_err)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, MlError> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            MlError::ArtifactMissing {
                path: path.display().to_string(),
            }
        } else {
            MlError::ArtifactIo {
                path: path.display().to_string(),
                source,
            }
        }
    })?;

    serde_json::from_slice(&bytes).map_err(|source| MlError::ArtifactFormat {
        path: path.display().to_string(),
        source,
    })
}
