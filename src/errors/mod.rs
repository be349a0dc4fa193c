//! Error handling module for the member picker backend.
//!
//! `PickerError` is what the core returns; `AppError` maps it onto HTTP status codes
//! and the response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const SAMPLE_SIZE_EXCEEDED: &str = "SAMPLE_SIZE_EXCEEDED";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

pub type PickerResult<T> = Result<T, PickerError>;

/// Failures of the member acquisition, filtering and sampling core.
#[derive(Debug, Error)]
pub enum PickerError {
    #[error("community token was rejected by the upstream API")]
    AuthInvalid,
    #[error("upstream request failed")]
    Network(#[from] reqwest::Error),
    #[error("upstream returned {status} for page {page}")]
    UpstreamStatus { page: u32, status: u16 },
    #[error("cannot pick {requested} members out of {available}")]
    SampleSizeExceeded { requested: usize, available: usize },
    #[error("sample count must be at least 1")]
    InvalidSampleCount,
    #[error("unrecognised filter: {0}")]
    InvalidFilter(String),
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed or rejected community token
    Unauthorized(String),
    /// Upstream directory could not be read
    Upstream(String),
    /// More picks requested than members left after filtering
    SampleSizeExceeded { requested: usize, available: usize },
    /// Validation error
    Validation(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::SampleSizeExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::Upstream(_) => codes::UPSTREAM_ERROR,
            AppError::SampleSizeExceeded { .. } => codes::SAMPLE_SIZE_EXCEEDED,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Upstream(msg) => msg.clone(),
            AppError::SampleSizeExceeded {
                requested,
                available,
            } => format!(
                "There are not {} members that fit these parameters ({} matched). \
                 Please try a smaller number or choose different filters.",
                requested, available
            ),
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<PickerError> for AppError {
    fn from(err: PickerError) -> Self {
        match err {
            PickerError::AuthInvalid => {
                AppError::Unauthorized("Invalid token! Please try again.".to_string())
            }
            PickerError::Network(e) => {
                tracing::error!("Upstream request failed: {:?}", e);
                AppError::Upstream(format!("Could not reach the community API: {}", e))
            }
            PickerError::UpstreamStatus { page, status } => {
                tracing::error!(page, status, "Upstream returned an error status");
                AppError::Upstream(format!(
                    "Community API returned {} while reading page {}",
                    status, page
                ))
            }
            PickerError::SampleSizeExceeded {
                requested,
                available,
            } => AppError::SampleSizeExceeded {
                requested,
                available,
            },
            PickerError::InvalidSampleCount => {
                AppError::Validation("Pick at least one member".to_string())
            }
            PickerError::InvalidFilter(label) => {
                AppError::BadRequest(format!("Unrecognised filter: {}", label))
            }
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let details = match error {
            AppError::SampleSizeExceeded {
                requested,
                available,
            } => Some(serde_json::json!({ "requested": requested, "available": available })),
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
