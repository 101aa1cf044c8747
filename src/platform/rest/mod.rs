mod documents;
mod http;
mod identity;
mod objects;

pub use documents::FirestoreStore;
pub use http::RestClient;
pub use identity::IdentityToolkit;
pub use objects::GcsObjectStore;

use std::sync::Arc;

use crate::core::config::SportsfestConfig;
use crate::platform::base::{DocumentStore, IdentityProvider, ObjectStore};

/// Wires the three REST stores onto one shared HTTP client.
pub fn build_platform(
    config: &SportsfestConfig,
) -> (
    Arc<dyn DocumentStore>,
    Arc<dyn ObjectStore>,
    Arc<dyn IdentityProvider>,
) {
    let rest = Arc::new(RestClient::new(
        config.timeout,
        config.max_retries,
        config.service_token.clone(),
    ));
    (
        Arc::new(FirestoreStore::new(rest.clone(), config)),
        Arc::new(GcsObjectStore::new(rest.clone(), config)),
        Arc::new(IdentityToolkit::new(rest, config)),
    )
}
