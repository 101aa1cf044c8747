use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde_json::json;
use tracing::{debug, error, info, warn};

use super::models::{AccountDeletion, DeletionError, DeletionStep};
use crate::core::config::SportsfestConfig;
use crate::platform::base::{DocumentStore, IdentityProvider, ObjectStore, Principal, StoreError};
use crate::utils::short_uid;

/// Cascading account deletion across the four stores.
///
/// The cascade runs strictly in order: profile document, owned
/// registrations, profile pictures, auth principal. Steps commit
/// independently and there is no compensation: if a later step fails the
/// earlier deletions stay deleted and the caller gets one generic
/// internal error. Self-service only; the guard runs before any store is
/// touched.
pub struct DeletionOrchestrator {
    documents: Arc<dyn DocumentStore>,
    objects: Arc<dyn ObjectStore>,
    identity: Arc<dyn IdentityProvider>,
    profiles_collection: String,
    registrations_collection: String,
    pictures_prefix: String,
    batch_limit: usize,
}

impl DeletionOrchestrator {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
        identity: Arc<dyn IdentityProvider>,
        config: &SportsfestConfig,
    ) -> Self {
        info!(
            "DeletionOrchestrator initialized (batch_limit={})",
            config.delete_batch_limit
        );
        Self {
            documents,
            objects,
            identity,
            profiles_collection: config.profiles_collection.clone(),
            registrations_collection: config.registrations_collection.clone(),
            pictures_prefix: config.profile_pictures_prefix.clone(),
            batch_limit: config.delete_batch_limit.max(1),
        }
    }

    pub async fn delete_account(
        &self,
        principal: Option<&Principal>,
        target_uid: &str,
    ) -> Result<AccountDeletion, DeletionError> {
        let Some(principal) = principal else {
            warn!("Account deletion refused: no authenticated principal");
            return Err(DeletionError::Unauthenticated);
        };
        if principal.uid != target_uid {
            warn!(
                "Account deletion refused: {} asked to delete {}",
                short_uid(&principal.uid),
                short_uid(target_uid)
            );
            return Err(DeletionError::Unauthorized {
                caller: principal.uid.clone(),
                target: target_uid.to_string(),
            });
        }

        warn!(
            "Account deletion started for {} - this is irreversible",
            short_uid(target_uid)
        );

        let profile_deleted = self.delete_profile(target_uid).await?;
        let registrations_deleted = self.delete_registrations(target_uid).await?;
        let (assets_deleted, assets_failed) = self.delete_assets(target_uid).await?;

        self.identity
            .delete_principal(target_uid)
            .await
            .map_err(|e| {
                error!(
                    "Failed to delete auth principal {}: {}",
                    short_uid(target_uid),
                    e
                );
                DeletionError::step(DeletionStep::Principal, e)
            })?;

        info!(
            "Account {} deleted ({} registrations, {} assets, {} asset failures)",
            short_uid(target_uid),
            registrations_deleted,
            assets_deleted,
            assets_failed
        );
        Ok(AccountDeletion {
            uid: target_uid.to_string(),
            profile_deleted,
            registrations_deleted,
            assets_deleted,
            assets_failed,
            principal_deleted: true,
            completed_at: Utc::now(),
        })
    }

    /// Step 1. A missing profile document is tolerated so an account whose
    /// profile was never written can still be deleted.
    async fn delete_profile(&self, uid: &str) -> Result<bool, DeletionError> {
        match self.documents.delete(&self.profiles_collection, uid).await {
            Ok(()) => {
                debug!("Profile document deleted for {}", short_uid(uid));
                Ok(true)
            }
            Err(StoreError::NotFound(_)) => {
                debug!("No profile document for {}", short_uid(uid));
                Ok(false)
            }
            Err(e) => {
                error!("Failed to delete profile for {}: {}", short_uid(uid), e);
                Err(DeletionError::step(DeletionStep::Profile, e))
            }
        }
    }

    /// Step 2. Matched registrations are deleted in batches no larger than
    /// the backend's write ceiling.
    async fn delete_registrations(&self, uid: &str) -> Result<usize, DeletionError> {
        let matched = self
            .documents
            .query_eq(&self.registrations_collection, "owner", json!(uid))
            .await
            .map_err(|e| {
                error!(
                    "Failed to query registrations owned by {}: {}",
                    short_uid(uid),
                    e
                );
                DeletionError::step(DeletionStep::Registrations, e)
            })?;

        if matched.is_empty() {
            debug!("No registrations owned by {}", short_uid(uid));
            return Ok(0);
        }

        let ids: Vec<String> = matched.iter().map(|d| d.id.clone()).collect();
        for chunk in ids.chunks(self.batch_limit) {
            self.documents
                .delete_batch(&self.registrations_collection, chunk)
                .await
                .map_err(|e| {
                    error!(
                        "Failed to batch delete {} registrations for {}: {}",
                        chunk.len(),
                        short_uid(uid),
                        e
                    );
                    DeletionError::step(DeletionStep::Registrations, e)
                })?;
        }

        info!(
            "Deleted {} registrations owned by {}",
            ids.len(),
            short_uid(uid)
        );
        Ok(ids.len())
    }

    /// Step 3. All per-asset deletes run concurrently and the step waits
    /// for every one to settle. Individual failures leave orphans behind
    /// and are logged, never fatal: a stale picture is cheaper than an
    /// undeletable account.
    async fn delete_assets(&self, uid: &str) -> Result<(usize, usize), DeletionError> {
        let prefix = format!("{}/{}/", self.pictures_prefix, uid);
        let paths = self.objects.list_prefix(&prefix).await.map_err(|e| {
            error!("Failed to list assets under {}: {}", prefix, e);
            DeletionError::step(DeletionStep::Assets, e)
        })?;

        if paths.is_empty() {
            debug!("No profile pictures under {}", prefix);
            return Ok((0, 0));
        }

        let deletions = paths.into_iter().map(|path| {
            let objects = Arc::clone(&self.objects);
            async move {
                let result = objects.delete(&path).await;
                (path, result)
            }
        });
        let settled = join_all(deletions).await;

        let mut deleted = 0;
        let mut failed = 0;
        for (path, result) in settled {
            match result {
                Ok(()) => deleted += 1,
                Err(e) => {
                    warn!("Failed to delete asset {} (orphan left behind): {}", path, e);
                    failed += 1;
                }
            }
        }

        debug!("Asset cleanup for {}: {} deleted, {} failed", short_uid(uid), deleted, failed);
        Ok((deleted, failed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::base::Document;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::Value;

    #[derive(Default)]
    struct CallLog(Mutex<Vec<String>>);

    impl CallLog {
        fn record(&self, entry: String) {
            self.0.lock().push(entry);
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().clone()
        }
    }

    struct MockDocuments {
        log: Arc<CallLog>,
        owned_registrations: Vec<String>,
        fail_profile_delete: bool,
        fail_query: bool,
    }

    #[async_trait]
    impl DocumentStore for MockDocuments {
        async fn get(&self, _c: &str, _id: &str) -> Result<Option<Document>, StoreError> {
            unreachable!("not used by the orchestrator")
        }

        async fn set(&self, _c: &str, _id: &str, _f: Value) -> Result<(), StoreError> {
            unreachable!("not used by the orchestrator")
        }

        async fn update(&self, _c: &str, _id: &str, _f: Value) -> Result<(), StoreError> {
            unreachable!("not used by the orchestrator")
        }

        async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
            self.log.record(format!("documents.delete {}/{}", collection, id));
            if self.fail_profile_delete {
                return Err(StoreError::Backend("profile delete failed".to_string()));
            }
            Ok(())
        }

        async fn query_eq(
            &self,
            collection: &str,
            field: &str,
            value: Value,
        ) -> Result<Vec<Document>, StoreError> {
            self.log.record(format!(
                "documents.query {} {}={}",
                collection,
                field,
                value.as_str().unwrap_or("?")
            ));
            if self.fail_query {
                return Err(StoreError::Backend("query failed".to_string()));
            }
            Ok(self
                .owned_registrations
                .iter()
                .map(|id| Document {
                    id: id.clone(),
                    fields: serde_json::json!({ "owner": value }),
                })
                .collect())
        }

        async fn list(&self, _c: &str) -> Result<Vec<Document>, StoreError> {
            unreachable!("not used by the orchestrator")
        }

        async fn delete_batch(&self, collection: &str, ids: &[String]) -> Result<(), StoreError> {
            self.log
                .record(format!("documents.delete_batch {} n={}", collection, ids.len()));
            Ok(())
        }
    }

    struct MockObjects {
        log: Arc<CallLog>,
        assets: Vec<String>,
        fail_delete_of: Option<String>,
    }

    #[async_trait]
    impl ObjectStore for MockObjects {
        async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
            self.log.record(format!("objects.list {}", prefix));
            Ok(self.assets.clone())
        }

        async fn delete(&self, path: &str) -> Result<(), StoreError> {
            self.log.record(format!("objects.delete {}", path));
            if self.fail_delete_of.as_deref() == Some(path) {
                return Err(StoreError::Backend("asset delete failed".to_string()));
            }
            Ok(())
        }
    }

    struct MockIdentity {
        log: Arc<CallLog>,
        fail_delete: bool,
    }

    #[async_trait]
    impl IdentityProvider for MockIdentity {
        async fn verify_token(&self, _token: &str) -> Result<Principal, StoreError> {
            unreachable!("not used by the orchestrator")
        }

        async fn delete_principal(&self, uid: &str) -> Result<(), StoreError> {
            self.log.record(format!("identity.delete_principal {}", uid));
            if self.fail_delete {
                return Err(StoreError::Backend("principal delete failed".to_string()));
            }
            Ok(())
        }
    }

    struct Setup {
        log: Arc<CallLog>,
        orchestrator: DeletionOrchestrator,
    }

    fn setup(
        owned_registrations: Vec<String>,
        assets: Vec<String>,
        configure: impl FnOnce(&mut MockDocuments, &mut MockObjects, &mut MockIdentity),
    ) -> Setup {
        let log = Arc::new(CallLog::default());
        let mut documents = MockDocuments {
            log: log.clone(),
            owned_registrations,
            fail_profile_delete: false,
            fail_query: false,
        };
        let mut objects = MockObjects {
            log: log.clone(),
            assets,
            fail_delete_of: None,
        };
        let mut identity = MockIdentity {
            log: log.clone(),
            fail_delete: false,
        };
        configure(&mut documents, &mut objects, &mut identity);

        let orchestrator = DeletionOrchestrator::new(
            Arc::new(documents),
            Arc::new(objects),
            Arc::new(identity),
            &SportsfestConfig::default(),
        );
        Setup { log, orchestrator }
    }

    fn principal(uid: &str) -> Principal {
        Principal {
            uid: uid.to_string(),
            email: None,
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_caller_deletes_nothing() {
        let s = setup(vec![], vec![], |_, _, _| {});
        let result = s.orchestrator.delete_account(None, "u1").await;
        assert!(matches!(result, Err(DeletionError::Unauthenticated)));
        assert!(s.log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_uid_mismatch_deletes_nothing() {
        let s = setup(vec!["r1".to_string()], vec![], |_, _, _| {});
        let attacker = principal("attacker");
        let result = s.orchestrator.delete_account(Some(&attacker), "victim").await;
        assert!(matches!(result, Err(DeletionError::Unauthorized { .. })));
        assert!(s.log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_full_cascade_order_and_outcome() {
        let s = setup(
            vec!["r1".to_string(), "r2".to_string(), "r3".to_string()],
            vec![
                "profile-pictures/u1/a.jpg".to_string(),
                "profile-pictures/u1/b.jpg".to_string(),
            ],
            |_, _, _| {},
        );

        let caller = principal("u1");
        let outcome = s
            .orchestrator
            .delete_account(Some(&caller), "u1")
            .await
            .unwrap();

        assert!(outcome.profile_deleted);
        assert_eq!(outcome.registrations_deleted, 3);
        assert_eq!(outcome.assets_deleted, 2);
        assert_eq!(outcome.assets_failed, 0);
        assert!(outcome.principal_deleted);

        let entries = s.log.entries();
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0], "documents.delete users/u1");
        assert_eq!(entries[1], "documents.query registrations owner=u1");
        assert_eq!(entries[2], "documents.delete_batch registrations n=3");
        assert_eq!(entries[3], "objects.list profile-pictures/u1/");
        // The two asset deletes run concurrently; order between them is free.
        let mut asset_deletes = vec![entries[4].clone(), entries[5].clone()];
        asset_deletes.sort();
        assert_eq!(
            asset_deletes,
            vec![
                "objects.delete profile-pictures/u1/a.jpg".to_string(),
                "objects.delete profile-pictures/u1/b.jpg".to_string(),
            ]
        );
        assert_eq!(entries[6], "identity.delete_principal u1");
    }

    #[tokio::test]
    async fn test_no_assets_still_deletes_principal() {
        let s = setup(vec![], vec![], |_, _, _| {});
        let caller = principal("u1");
        let outcome = s
            .orchestrator
            .delete_account(Some(&caller), "u1")
            .await
            .unwrap();

        assert_eq!(outcome.assets_deleted, 0);
        assert!(outcome.principal_deleted);
        let entries = s.log.entries();
        assert!(entries.contains(&"identity.delete_principal u1".to_string()));
        assert!(!entries.iter().any(|e| e.starts_with("objects.delete")));
    }

    #[tokio::test]
    async fn test_principal_failure_reports_internal_and_keeps_earlier_deletes() {
        let s = setup(
            vec!["r1".to_string()],
            vec!["profile-pictures/u1/a.jpg".to_string()],
            |_, _, identity| identity.fail_delete = true,
        );

        let caller = principal("u1");
        let result = s.orchestrator.delete_account(Some(&caller), "u1").await;

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            DeletionError::Step {
                step: DeletionStep::Principal,
                ..
            }
        ));
        assert_eq!(err.code(), "internal");

        // No rollback: the earlier deletions already happened and stay.
        let entries = s.log.entries();
        assert!(entries.contains(&"documents.delete users/u1".to_string()));
        assert!(entries.contains(&"documents.delete_batch registrations n=1".to_string()));
        assert!(entries.contains(&"objects.delete profile-pictures/u1/a.jpg".to_string()));
    }

    #[tokio::test]
    async fn test_large_registration_sets_are_chunked() {
        let ids: Vec<String> = (0..1200).map(|i| format!("r{}", i)).collect();
        let s = setup(ids, vec![], |_, _, _| {});

        let caller = principal("u1");
        let outcome = s
            .orchestrator
            .delete_account(Some(&caller), "u1")
            .await
            .unwrap();
        assert_eq!(outcome.registrations_deleted, 1200);

        let batches: Vec<String> = s
            .log
            .entries()
            .into_iter()
            .filter(|e| e.starts_with("documents.delete_batch"))
            .collect();
        assert_eq!(
            batches,
            vec![
                "documents.delete_batch registrations n=500".to_string(),
                "documents.delete_batch registrations n=500".to_string(),
                "documents.delete_batch registrations n=200".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_asset_failure_is_not_fatal() {
        let s = setup(
            vec![],
            vec![
                "profile-pictures/u1/a.jpg".to_string(),
                "profile-pictures/u1/b.jpg".to_string(),
            ],
            |_, objects, _| {
                objects.fail_delete_of = Some("profile-pictures/u1/a.jpg".to_string())
            },
        );

        let caller = principal("u1");
        let outcome = s
            .orchestrator
            .delete_account(Some(&caller), "u1")
            .await
            .unwrap();

        assert_eq!(outcome.assets_deleted, 1);
        assert_eq!(outcome.assets_failed, 1);
        assert!(outcome.principal_deleted);
    }

    #[tokio::test]
    async fn test_missing_profile_document_is_tolerated() {
        // Profile delete answers NotFound; the cascade must keep going.
        struct NotFoundDocs {
            log: Arc<CallLog>,
        }

        #[async_trait]
        impl DocumentStore for NotFoundDocs {
            async fn get(&self, _c: &str, _id: &str) -> Result<Option<Document>, StoreError> {
                unreachable!()
            }
            async fn set(&self, _c: &str, _id: &str, _f: Value) -> Result<(), StoreError> {
                unreachable!()
            }
            async fn update(&self, _c: &str, _id: &str, _f: Value) -> Result<(), StoreError> {
                unreachable!()
            }
            async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
                self.log.record(format!("documents.delete {}/{}", collection, id));
                Err(StoreError::NotFound(id.to_string()))
            }
            async fn query_eq(
                &self,
                _c: &str,
                _f: &str,
                _v: Value,
            ) -> Result<Vec<Document>, StoreError> {
                Ok(vec![])
            }
            async fn list(&self, _c: &str) -> Result<Vec<Document>, StoreError> {
                unreachable!()
            }
            async fn delete_batch(&self, _c: &str, _ids: &[String]) -> Result<(), StoreError> {
                Ok(())
            }
        }

        let log = Arc::new(CallLog::default());
        let orchestrator = DeletionOrchestrator::new(
            Arc::new(NotFoundDocs { log: log.clone() }),
            Arc::new(MockObjects {
                log: log.clone(),
                assets: vec![],
                fail_delete_of: None,
            }),
            Arc::new(MockIdentity {
                log: log.clone(),
                fail_delete: false,
            }),
            &SportsfestConfig::default(),
        );

        let caller = principal("u1");
        let outcome = orchestrator
            .delete_account(Some(&caller), "u1")
            .await
            .unwrap();
        assert!(!outcome.profile_deleted);
        assert!(outcome.principal_deleted);
    }

    #[tokio::test]
    async fn test_query_failure_stops_the_cascade() {
        let s = setup(vec![], vec!["profile-pictures/u1/a.jpg".to_string()], |documents, _, _| {
            documents.fail_query = true;
        });

        let caller = principal("u1");
        let result = s.orchestrator.delete_account(Some(&caller), "u1").await;
        assert!(matches!(
            result,
            Err(DeletionError::Step {
                step: DeletionStep::Registrations,
                ..
            })
        ));

        // Later steps never ran.
        let entries = s.log.entries();
        assert!(!entries.iter().any(|e| e.starts_with("objects.")));
        assert!(!entries.iter().any(|e| e.starts_with("identity.")));
    }
}
