mod models;
mod service;

pub use models::{NewRegistrant, Registrant, RegistrationError, Sex, UpdateRegistrant};
pub use service::RegistrationService;
