use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::models::{NewRegistrant, Registrant, RegistrationError, UpdateRegistrant};
use crate::core::houses::House;
use crate::core::services::assignment::AssignmentService;
use crate::platform::base::DocumentStore;
use crate::utils::mask_contact;

/// CRUD over the registrations collection.
pub struct RegistrationService {
    store: Arc<dyn DocumentStore>,
    assignment: AssignmentService,
    collection: String,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn DocumentStore>, registrations_collection: &str) -> Self {
        info!(
            "RegistrationService initialized (collection={})",
            registrations_collection
        );
        let assignment = AssignmentService::new(store.clone(), registrations_collection);
        Self {
            store,
            assignment,
            collection: registrations_collection.to_string(),
        }
    }

    /// Validates a submission, assigns the least-populated house and
    /// persists the registration.
    pub async fn register(&self, new: NewRegistrant) -> Result<Registrant, RegistrationError> {
        new.validate()?;

        let house = self.assignment.assign().await;
        let id = format!(
            "reg_{}",
            Uuid::new_v4().to_string().chars().take(12).collect::<String>()
        );
        let now = Utc::now();

        let registrant = Registrant {
            id: id.clone(),
            full_name: new.full_name.trim().to_string(),
            age: new.age,
            sex: new.sex,
            religion: new.religion.trim().to_string(),
            contact: new.contact.trim().to_string(),
            owner: new.owner,
            house,
            created_at: now,
            updated_at: now,
        };

        self.store
            .set(&self.collection, &id, registrant.to_fields())
            .await?;

        info!(
            "Registrant created: {} -> {} (contact {})",
            id,
            house,
            mask_contact(&registrant.contact)
        );
        Ok(registrant)
    }

    pub async fn get(&self, id: &str) -> Result<Registrant, RegistrationError> {
        let Some(doc) = self.store.get(&self.collection, id).await? else {
            return Err(RegistrationError::NotFound(id.to_string()));
        };
        Registrant::from_document(&doc)
    }

    /// All registrations, optionally narrowed to one house. Documents that
    /// no longer parse are skipped with a warning rather than failing the
    /// whole listing.
    pub async fn list(&self, house: Option<House>) -> Result<Vec<Registrant>, RegistrationError> {
        let documents = match house {
            Some(house) => {
                self.store
                    .query_eq(&self.collection, "house", json!(house.key()))
                    .await?
            }
            None => self.store.list(&self.collection).await?,
        };

        let mut registrants = Vec::with_capacity(documents.len());
        for doc in &documents {
            match Registrant::from_document(doc) {
                Ok(registrant) => registrants.push(registrant),
                Err(e) => warn!("Skipping malformed registration: {}", e),
            }
        }
        debug!("Listed {} registrants (house={:?})", registrants.len(), house);
        Ok(registrants)
    }

    /// Admin edit of identity fields. The house key and the owner uid are
    /// never part of the patch.
    pub async fn update_details(
        &self,
        id: &str,
        update: UpdateRegistrant,
    ) -> Result<Registrant, RegistrationError> {
        if update.is_empty() {
            return Err(RegistrationError::Validation(
                "no fields to update".to_string(),
            ));
        }
        update.validate()?;

        let mut registrant = self.get(id).await?;

        let mut patch = serde_json::Map::new();
        if let Some(name) = update.full_name {
            registrant.full_name = name.trim().to_string();
            patch.insert("full_name".to_string(), json!(registrant.full_name));
        }
        if let Some(age) = update.age {
            registrant.age = age;
            patch.insert("age".to_string(), json!(age));
        }
        if let Some(sex) = update.sex {
            registrant.sex = sex;
            patch.insert("sex".to_string(), json!(sex));
        }
        if let Some(religion) = update.religion {
            registrant.religion = religion.trim().to_string();
            patch.insert("religion".to_string(), json!(registrant.religion));
        }
        if let Some(contact) = update.contact {
            registrant.contact = contact.trim().to_string();
            patch.insert("contact".to_string(), json!(registrant.contact));
        }
        registrant.updated_at = Utc::now();
        patch.insert("updated_at".to_string(), json!(registrant.updated_at));

        self.store
            .update(&self.collection, id, Value::Object(patch))
            .await?;

        info!("Registrant updated: {}", id);
        Ok(registrant)
    }

    /// Current per-house counts, derived from the live registration set.
    pub async fn count_by_house(&self) -> HashMap<House, u64> {
        self.assignment.snapshot_counts().await
    }
}
