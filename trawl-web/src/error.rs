//! HTTP error mapping for API handlers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use trawl_core::config::ConfigError;
use trawl_core::transfer::TransferError;

/// Client-facing API error: a status code plus a structured JSON message.
///
/// Handlers return this instead of bare status codes so failures always
/// surface as `{"error": "..."}` bodies, never raw stack traces.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// 404 with the given message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// 500 with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("API error: {}", self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<TransferError> for ApiError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::TaskNotFound { .. } => ApiError::not_found("Task not found"),
            TransferError::EngineShutdown => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "Task engine is shut down".to_string(),
            },
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<trawl_core::StorageError> for ApiError {
    fn from(e: trawl_core::StorageError) -> Self {
        ApiError::internal(e.to_string())
    }
}
