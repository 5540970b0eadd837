use thiserror::Error;

/// Error types for store operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid date '{value}' for {field}, expected YYYY-MM-DD")]
    InvalidDate { field: String, value: String },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for store operations
pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    /// True when the caller supplied bad input rather than the store failing
    pub fn is_client_error(&self) -> bool {
        matches!(self, DataError::InvalidDate { .. } | DataError::InvalidRange { .. })
    }

    /// Create an invalid date error with field context
    pub fn invalid_date<S: Into<String>>(field: S, value: S) -> Self {
        DataError::InvalidDate {
            field: field.into(),
            value: value.into(),
        }
    }
}
