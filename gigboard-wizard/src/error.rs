//! Error types for the wizard HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::publish::PublishError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Publish refused or failed
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// gigboard-common error
    #[error("Common error: {0}")]
    Common(#[from] gigboard_common::Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Publish(err) => match err {
                PublishError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
                PublishError::IncompleteDraft(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "INCOMPLETE_DRAFT")
                }
                PublishError::NotOnReview(_) => (StatusCode::UNPROCESSABLE_ENTITY, "NOT_ON_REVIEW"),
                PublishError::PublishInFlight => (StatusCode::CONFLICT, "PUBLISH_IN_FLIGHT"),
                PublishError::CreationFailed(_) => (StatusCode::BAD_GATEWAY, "CREATION_FAILED"),
            },
            ApiError::Common(err) => match err {
                gigboard_common::Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                gigboard_common::Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();
        let message = match &self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => {
                msg.clone()
            }
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, error = %message, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
