//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use lawbot_core::completion::{
    CompletionError, NOT_CONFIGURED_MESSAGE, UPSTREAM_FAILURE_MESSAGE,
};
use lawbot_core::history::HistoryError;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Status code, machine-readable code, and the text shown to the user.
    pub fn parts(&self) -> (StatusCode, &'static str, &str) {
        match self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::NotConfigured(m) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "configuration_error",
                m.as_str(),
            ),
            AppError::Upstream(m) => (StatusCode::BAD_GATEWAY, "api_error", m.as_str()),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            error!(%detail, "request failed");
        }
        let (status, error, message) = self.parts();
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<HistoryError> for AppError {
    fn from(e: HistoryError) -> Self {
        match e {
            HistoryError::Validation(msg) => AppError::Validation(msg),
            HistoryError::Db(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<CompletionError> for AppError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::NotConfigured => AppError::NotConfigured(NOT_CONFIGURED_MESSAGE.into()),
            CompletionError::Config(msg) => AppError::Internal(msg),
            _ => AppError::Upstream(UPSTREAM_FAILURE_MESSAGE.into()),
        }
    }
}
