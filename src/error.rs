//! Error types for Geofinder
//!
//! Infrastructure errors are converted to `AppError`, which implements
//! `IntoResponse` for proper HTTP error responses.
//!
//! The search endpoint is the exception: its failures are `SearchError`s
//! and travel over the same channel as successful results, as a 200
//! response whose JSON body is an error object instead of an array.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Store could not be opened (500)
    #[error("DB connection failed: {0}")]
    Connection(sqlx::Error),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP client error (502)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Photo service rejected the lookup (502)
    #[error("Photo service error: {0}")]
    Photos(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Maps each error variant to an HTTP status code and JSON error body.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message, error_type) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string(), "not_found"),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "validation"),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string(), "http_client"),
            AppError::Photos(msg) => (StatusCode::BAD_GATEWAY, msg.clone(), "photos"),
            AppError::Connection(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DB connection failed".to_string(),
                "connection",
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                "database",
            ),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "config"),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "internal",
            ),
        };

        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[error_type])
            .inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Per-request failure of the geocache search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Payload absent or not a JSON object
    #[error("No valid input received.")]
    MissingInput,

    /// Payload parsed but a field is unusable (missing, non-numeric, out of order)
    #[error("Invalid input: {0}")]
    Input(String),

    /// The lookup itself failed in the store
    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),
}

impl SearchError {
    /// Metric label for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::MissingInput | SearchError::Input(_) => "input",
            SearchError::Query(_) => "query",
        }
    }

    /// Structured body sent back to the caller.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            SearchError::MissingInput => ErrorBody {
                error: self.to_string(),
                message: None,
            },
            SearchError::Input(detail) => ErrorBody {
                error: "Invalid input".to_string(),
                message: Some(detail.clone()),
            },
            SearchError::Query(source) => ErrorBody {
                error: "Query failed".to_string(),
                message: Some(source.to_string()),
            },
        }
    }
}

impl IntoResponse for SearchError {
    /// Always 200: callers distinguish failure by payload shape.
    fn into_response(self) -> Response {
        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[self.kind()])
            .inc();

        (StatusCode::OK, axum::Json(self.to_body())).into_response()
    }
}

/// Error object returned in place of a result sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
