use thiserror::Error;

use crate::core::services::deletion::DeletionError;
use crate::core::services::registration::RegistrationError;
use crate::platform::StoreError;
use crate::toolkit::analytics::AnalyticsError;

/// Crate-level error. Module-level errors convert into it at the seams
/// where a caller does not care which subsystem failed.
#[derive(Error, Debug)]
pub enum SportsfestError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Deletion error: {0}")]
    Deletion(#[from] DeletionError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SportsfestError>;
