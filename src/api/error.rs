use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::core::services::deletion::DeletionError;
use crate::core::services::registration::RegistrationError;
use crate::toolkit::analytics::AnalyticsError;

/// Wire-level error for the HTTP surface.
///
/// Full failure detail is logged where the conversion happens; callers
/// only ever see the code and a generic message.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing or invalid credentials")]
    Unauthenticated,

    #[error("Not allowed")]
    PermissionDenied,

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::PermissionDenied => "permission-denied",
            Self::InvalidArgument(_) => "invalid-argument",
            Self::NotFound(_) => "not-found",
            Self::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));
        (self.status(), body).into_response()
    }
}

impl From<RegistrationError> for ApiError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::Validation(msg) => ApiError::InvalidArgument(msg),
            RegistrationError::NotFound(id) => ApiError::NotFound(format!("registrant {}", id)),
            other => {
                error!("Registration failure: {}", other);
                ApiError::Internal("internal error".to_string())
            }
        }
    }
}

impl From<DeletionError> for ApiError {
    fn from(e: DeletionError) -> Self {
        match &e {
            DeletionError::Unauthenticated => ApiError::Unauthenticated,
            DeletionError::Unauthorized { .. } => ApiError::PermissionDenied,
            DeletionError::Step { .. } => {
                // Operators get the step and cause; the caller gets one
                // generic message with no hint of partial completion.
                error!("Account deletion failed: {}", e);
                ApiError::Internal("error deleting account".to_string())
            }
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        error!("Analytics failure: {}", e);
        ApiError::Internal("internal error".to_string())
    }
}
