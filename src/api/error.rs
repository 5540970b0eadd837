use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::data::DataError;
use crate::forecast::ForecastError;

/// JSON error body: `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by handlers. Only `message` reaches the client; internal
/// detail is logged where the error is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("Bad request: {}", msg);
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// 500 with a public message; `detail` goes to the log only
    pub fn internal(public: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        let public = public.into();
        tracing::error!(error = %detail, "{}", public);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, public)
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::error!("Service unavailable: {}", msg);
        Self::new(StatusCode::SERVICE_UNAVAILABLE, msg)
    }

    /// Map a store error: bad input is a 400, anything else a 500 with the
    /// given public message
    pub fn from_data(err: DataError, public: &str) -> Self {
        if err.is_client_error() {
            Self::bad_request(err.to_string())
        } else {
            Self::internal(public, err)
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::ModelUnavailable => Self::unavailable(err.to_string()),
            ForecastError::InvalidHorizon { .. } => Self::bad_request(err.to_string()),
            ForecastError::DateOutOfRange { .. } | ForecastError::Prediction(_) => {
                Self::internal("Failed to generate forecast", err)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
