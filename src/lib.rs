#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(unused_variables)]

pub mod api;
pub mod core;
pub mod platform;
pub mod toolkit;
pub mod utils;

pub use crate::utils::{mask_contact, short_uid};

pub use crate::core::config::SportsfestConfig;
pub use crate::core::error::{Result, SportsfestError};
pub use crate::core::houses::{House, HouseDefinition};
pub use crate::platform::{DocumentStore, IdentityProvider, ObjectStore, Principal, StoreError};

/// Project id used when nothing is configured (local emulator setups).
pub const DEFAULT_PROJECT_ID: &str = "sportsfest-dev";

pub const DEFAULT_BIND_PORT: u16 = 8080;

/// Firestore commit batches are capped at 500 writes.
pub const DEFAULT_DELETE_BATCH_LIMIT: usize = 500;

pub const DEFAULT_STATS_CACHE_TTL: u64 = 60;

pub const DEFAULT_STATS_CACHE_SIZE: usize = 64;

/// Storage prefix under which per-account profile pictures live.
pub const PROFILE_PICTURES_PREFIX: &str = "profile-pictures";
