//! Error mapping at the handler boundary.
//!
//! Every failure a handler can produce converts into a status code and a
//! JSON `{"error": ...}` body. Store detail never leaks to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;
use crate::validation::ValidationError;

/// Application-level error for the API layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad client input detected by payload validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// Bad client input detected by a handler itself.
    #[error("{0}")]
    BadRequest(String),
    /// The requested resource does not exist.
    #[error("{0} not found")]
    NotFound(String),
    /// Any failure from the document-store collaborator.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { path } => Self::NotFound(format!("document {path}")),
            other => Self::Store(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(_) | Self::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Store(err) => {
                // Upstream detail goes to the log, not to the caller.
                tracing::error!(error = %err, "document store request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "document store error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
