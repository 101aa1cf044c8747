use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Retry exhausted after {0} attempts: {1}")]
    RetryExhausted(u32, String),
}

/// A document in a collection: its id plus a plain JSON object of fields.
/// Backend-specific field encodings stay inside the store implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

/// An authenticated account as reported by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Collection-based document store with equality queries and batch deletes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Creates or fully overwrites a document.
    async fn set(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError>;

    /// Merges `fields` into an existing document; `NotFound` if it is missing.
    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// All documents where `field == value`.
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Document>, StoreError>;

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Deletes a set of documents in one backend batch. Callers are
    /// responsible for keeping each call under the backend's batch ceiling.
    async fn delete_batch(&self, collection: &str, ids: &[String]) -> Result<(), StoreError>;
}

/// Binary object store: prefix listing and per-object deletion.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    async fn delete(&self, path: &str) -> Result<(), StoreError>;
}

/// Authentication backend: token verification and principal deletion.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<Principal, StoreError>;

    async fn delete_principal(&self, uid: &str) -> Result<(), StoreError>;
}
