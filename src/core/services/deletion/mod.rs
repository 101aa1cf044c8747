mod models;
mod orchestrator;

pub use models::{AccountDeletion, DeletionError, DeletionStep};
pub use orchestrator::DeletionOrchestrator;
