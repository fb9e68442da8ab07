//! HTTP error mapping
//!
//! Error body: `{"error": {"code": "...", "message": "..."}}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::CatalogError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Catalog operation failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Body, query string or path could not be decoded
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::Catalog(err) => match err {
                CatalogError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                CatalogError::InvalidPage { .. } => (StatusCode::BAD_REQUEST, "INVALID_PAGE"),
                CatalogError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                CatalogError::Conflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
                CatalogError::Enrichment { .. } => (StatusCode::BAD_GATEWAY, "ENRICHMENT_ERROR"),
                CatalogError::Parse { .. } => (StatusCode::BAD_GATEWAY, "PARSE_ERROR"),
                CatalogError::Cancelled { .. } => (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED"),
                CatalogError::Persistence { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
