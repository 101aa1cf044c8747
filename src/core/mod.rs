pub mod config;
pub mod error;
pub mod houses;

pub mod services;

pub use config::SportsfestConfig;
pub use error::{Result, SportsfestError};

pub use houses::{
    House, HouseDefinition, format_counts_table, get_house_definition, HOUSES,
};

pub use services::{
    AssignmentService, DeletionError, DeletionOrchestrator, AccountDeletion,
    NewRegistrant, Registrant, RegistrationError, RegistrationService, UpdateRegistrant,
    select_house, select_house_with,
};
