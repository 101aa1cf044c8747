use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

use crate::platform::base::StoreError;

/// The four stores touched by an account deletion, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum DeletionStep {
    Profile,
    Registrations,
    Assets,
    Principal,
}

impl std::fmt::Display for DeletionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(<&'static str>::from(*self))
    }
}

/// What a completed cascade actually removed.
///
/// `assets_failed` counts profile pictures that could not be deleted;
/// those are left behind as orphans rather than blocking the cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDeletion {
    pub uid: String,
    pub profile_deleted: bool,
    pub registrations_deleted: usize,
    pub assets_deleted: usize,
    pub assets_failed: usize,
    pub principal_deleted: bool,
    pub completed_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum DeletionError {
    #[error("No authenticated principal")]
    Unauthenticated,

    #[error("Caller {caller} may not delete account {target}")]
    Unauthorized { caller: String, target: String },

    #[error("Deletion step {step} failed: {source}")]
    Step {
        step: DeletionStep,
        #[source]
        source: StoreError,
    },
}

impl DeletionError {
    pub fn step(step: DeletionStep, source: StoreError) -> Self {
        Self::Step { step, source }
    }

    /// Wire error code for the callable surface. Step failures are all
    /// reported as `internal`; which steps had already completed is not
    /// exposed to the caller.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Unauthorized { .. } => "permission-denied",
            Self::Step { .. } => "internal",
        }
    }
}
