//! HTTP error mapping.
//!
//! # Invariants
//! - Response bodies are plain text.
//! - Store failure details are logged, never returned to the client.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use thiserror::Error;
use todo_core::RepoError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by todo HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client payload or query failed field validation.
    #[error("{0}")]
    Validation(String),

    #[error("Todo Not Found")]
    NotFound,

    /// Request body that is not valid JSON for the target payload.
    #[error(transparent)]
    Body(#[from] JsonRejection),

    /// Store or runtime failure; the detail stays server-side.
    #[error("Internal Server Error")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(err) => ApiError::Validation(err.to_string()),
            RepoError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("store task failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Body(rejection) => rejection.into_response(),
            ApiError::Internal(detail) => {
                error!("event=http_error module=api status=error error={detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            other => (other.status_code(), other.to_string()).into_response(),
        }
    }
}
