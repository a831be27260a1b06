//! Unified error types for the counter API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Unified error type for startup and command-line operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key-value store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request to the store failed (network, throttling, service error).
    #[error("{operation} failed: {message}")]
    Request {
        /// Store operation that failed.
        operation: &'static str,
        /// Error detail reported by the client.
        message: String,
    },

    /// The store returned an item that does not look like a counter.
    #[error("malformed item: {0}")]
    MalformedItem(String),

    /// The add would leave the counter outside the storable range.
    #[error("counter {id} overflow adding {delta}")]
    Overflow {
        /// Counter key.
        id: String,
        /// Rejected delta.
        delta: i64,
    },

    /// Injected failure from the in-memory backend.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// HTTP API error that converts to a sanitized JSON response.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request body could not be decoded.
    #[error("unprocessable request body: {0}")]
    Unprocessable(String),

    /// Store call failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Requested resource does not exist.
    #[error("not found")]
    NotFound,
}

/// JSON error response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message, never carrying internal details.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            Self::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unprocessable_entity",
                msg.clone(),
            ),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "Resource not found".to_string(),
            ),
            Self::Store(err) => {
                crate::metrics::inc_store_errors();
                tracing::error!(error = %err, "store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Failed to reach the counter store".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
