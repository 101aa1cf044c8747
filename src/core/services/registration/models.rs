use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::core::houses::House;
use crate::platform::base::{Document, StoreError};

const MIN_AGE: u32 = 3;
const MAX_AGE: u32 = 100;
const MAX_NAME_LEN: usize = 120;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9][0-9 \-]{6,14}$").unwrap();
}

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Registrant not found: {0}")]
    NotFound(String),

    #[error("Malformed registration document {0}: {1}")]
    Malformed(String, String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for RegistrationError {
    fn from(e: StoreError) -> Self {
        RegistrationError::Store(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// A stored registration.
///
/// The house key is assigned at creation and never changes afterwards;
/// `update_details` only touches the identity fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registrant {
    pub id: String,
    pub full_name: String,
    pub age: u32,
    pub sex: Sex,
    pub religion: String,
    pub contact: String,
    /// Uid of the account that submitted this registration.
    pub owner: String,
    pub house: House,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registrant {
    /// Document fields for persistence (everything except the id, which is
    /// the document key).
    pub fn to_fields(&self) -> Value {
        let mut value = serde_json::json!(self);
        if let Value::Object(map) = &mut value {
            map.remove("id");
        }
        value
    }

    pub fn from_document(doc: &Document) -> Result<Self, RegistrationError> {
        let mut value = doc.fields.clone();
        if let Value::Object(map) = &mut value {
            map.insert("id".to_string(), Value::String(doc.id.clone()));
        }
        serde_json::from_value(value)
            .map_err(|e| RegistrationError::Malformed(doc.id.clone(), e.to_string()))
    }
}

/// Submission payload for a new registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegistrant {
    pub full_name: String,
    pub age: u32,
    pub sex: Sex,
    pub religion: String,
    pub contact: String,
    pub owner: String,
}

impl NewRegistrant {
    pub fn validate(&self) -> Result<(), RegistrationError> {
        validate_name(&self.full_name)?;
        validate_age(self.age)?;
        validate_contact(&self.contact)?;
        if self.religion.trim().is_empty() {
            return Err(RegistrationError::Validation(
                "religion must not be empty".to_string(),
            ));
        }
        if self.owner.trim().is_empty() {
            return Err(RegistrationError::Validation(
                "owner uid must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Admin edit of identity fields. House and owner are not editable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRegistrant {
    pub full_name: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub religion: Option<String>,
    pub contact: Option<String>,
}

impl UpdateRegistrant {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.age.is_none()
            && self.sex.is_none()
            && self.religion.is_none()
            && self.contact.is_none()
    }

    pub fn validate(&self) -> Result<(), RegistrationError> {
        if let Some(name) = &self.full_name {
            validate_name(name)?;
        }
        if let Some(age) = self.age {
            validate_age(age)?;
        }
        if let Some(contact) = &self.contact {
            validate_contact(contact)?;
        }
        if let Some(religion) = &self.religion {
            if religion.trim().is_empty() {
                return Err(RegistrationError::Validation(
                    "religion must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), RegistrationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RegistrationError::Validation(
            "full name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(RegistrationError::Validation(format!(
            "full name longer than {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_age(age: u32) -> Result<(), RegistrationError> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(RegistrationError::Validation(format!(
            "age must be between {} and {}",
            MIN_AGE, MAX_AGE
        )));
    }
    Ok(())
}

fn validate_contact(contact: &str) -> Result<(), RegistrationError> {
    let trimmed = contact.trim();
    if EMAIL_RE.is_match(trimmed) || PHONE_RE.is_match(trimmed) {
        Ok(())
    } else {
        Err(RegistrationError::Validation(
            "contact must be a phone number or an email address".to_string(),
        ))
    }
}
