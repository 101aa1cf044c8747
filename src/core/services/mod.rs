pub mod assignment;
pub mod deletion;
pub mod registration;

pub use assignment::{select_house, select_house_with, AssignmentService};
pub use deletion::{AccountDeletion, DeletionError, DeletionOrchestrator, DeletionStep};
pub use registration::{
    NewRegistrant, Registrant, RegistrationError, RegistrationService, Sex, UpdateRegistrant,
};
