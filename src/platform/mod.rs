pub mod base;
pub mod rest;

pub use base::{Document, DocumentStore, IdentityProvider, ObjectStore, Principal, StoreError};
pub use rest::{build_platform, FirestoreStore, GcsObjectStore, IdentityToolkit, RestClient};
