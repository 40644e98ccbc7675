//! Structured error types for HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use tracing::error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    InvalidBody,
    InvalidFieldValue,
    InvalidPath,

    // Not found errors
    TaskNotFound,

    // Internal errors
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    /// HTTP status reported for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::InvalidBody
            | ErrorCode::InvalidFieldValue
            | ErrorCode::InvalidPath => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::TaskNotFound => StatusCode::NOT_FOUND,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Structured error returned by every failing endpoint.
///
/// Serializes as `{"detail": ..., "code": ..., "field": ...}`.
#[derive(Debug, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    #[serde(rename = "detail")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn invalid_body(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidBody, reason)
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn invalid_path(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPath, reason)
    }

    pub fn task_not_found() -> Self {
        Self::new(ErrorCode::TaskNotFound, "Task not found")
    }

    /// Storage failure. The cause is logged, the client sees a generic message.
    pub fn database(err: impl fmt::Display) -> Self {
        error!(error = %err, "Database operation failed");
        Self::new(ErrorCode::DatabaseError, "Database operation failed")
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        error!(error = %err, "Internal error");
        Self::new(ErrorCode::InternalError, "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

// Store operations return anyhow errors; anything that is not already an
// ApiError came from SQLite.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api_err) => api_err,
            Err(err) => ApiError::database(format!("{:#}", err)),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
