//! HTTP response types and utilities
//!
//! JSON endpoints answer with the `{success, data | error}` envelope.
//! Search and category listings carry a few extra top-level fields.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::errors::AppError;
use crate::models::{CanonicalMovie, Pagination};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Search response; `sources` and `aggregated` only appear for aggregated searches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub data: Vec<CanonicalMovie>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregated: Option<bool>,
}

impl SearchResponse {
    pub fn single(data: Vec<CanonicalMovie>) -> Self {
        Self {
            success: true,
            data,
            sources: None,
            aggregated: None,
        }
    }

    pub fn aggregated(data: Vec<CanonicalMovie>, sources: usize) -> Self {
        Self {
            success: true,
            data,
            sources: Some(sources),
            aggregated: Some(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub success: bool,
    pub data: Vec<CanonicalMovie>,
    pub pagination: Pagination,
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> impl IntoResponse {
    let (status, message) = match &error {
        AppError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
        AppError::NotFound { resource, id } => (
            StatusCode::NOT_FOUND,
            format!("{resource} with id '{id}' not found"),
        ),
        AppError::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message.clone()),
        AppError::Upstream { message, .. } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        AppError::Configuration { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Configuration error: {message}"),
        ),
    };

    if status.is_server_error() {
        error!("Request failed: {:#}", anyhow::Error::new(error));
    } else {
        warn!("Request rejected: {}", error);
    }

    (status, Json(ApiResponse::<()>::error(message)))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        handle_error(self).into_response()
    }
}

/// Success response helper
pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}
