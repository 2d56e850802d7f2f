//! Error types for the cache-aside layer
//!
//! Provides unified error handling using thiserror. Collaborator failures are
//! wrapped as-is and propagated to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the crate.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key-value store failure (connectivity, protocol)
    #[error("Store error: {0}")]
    Store(String),

    /// Record repository failure (query, connectivity)
    #[error("Repository error: {0}")]
    Repository(String),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid cache settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record not found (HTTP layer only)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data (HTTP layer only)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Store(_) | CacheError::Repository(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Serialization(_) | CacheError::InvalidConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
