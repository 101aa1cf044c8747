use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::selector::select_house;
use crate::core::houses::House;
use crate::platform::base::DocumentStore;

/// Assigns houses to new registrants.
///
/// The count snapshot is read fresh from the store before every
/// assignment and is deliberately unguarded: two concurrent registrations
/// can both land in the same house, and the resulting transient imbalance
/// is accepted. Balance is a soft goal, so a failed snapshot degrades to
/// an empty count map instead of failing the registration.
pub struct AssignmentService {
    store: Arc<dyn DocumentStore>,
    registrations_collection: String,
}

impl AssignmentService {
    pub fn new(store: Arc<dyn DocumentStore>, registrations_collection: &str) -> Self {
        info!(
            "AssignmentService initialized (collection={})",
            registrations_collection
        );
        Self {
            store,
            registrations_collection: registrations_collection.to_string(),
        }
    }

    /// Current per-house registration counts, best effort.
    pub async fn snapshot_counts(&self) -> HashMap<House, u64> {
        let documents = match self.store.list(&self.registrations_collection).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!("House count snapshot failed, assigning uniformly: {}", e);
                return HashMap::new();
            }
        };

        let mut counts: HashMap<House, u64> = HashMap::new();
        for doc in &documents {
            let Some(key) = doc.fields.get("house").and_then(Value::as_str) else {
                continue;
            };
            match House::from_key(key) {
                Some(house) => *counts.entry(house).or_insert(0) += 1,
                None => warn!("Registration {} has unknown house key {:?}", doc.id, key),
            }
        }
        counts
    }

    pub async fn assign(&self) -> House {
        let counts = self.snapshot_counts().await;
        let house = select_house(&counts);
        debug!("Assigned house {} (counts: {:?})", house, counts);
        house
    }
}
