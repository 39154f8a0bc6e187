//! Control-plane entity records.
//!
//! # Responsibility
//! - Define the flat record shapes persisted by the repository layer.
//! - Validate records before they reach storage.
//!
//! # Invariants
//! - `id == 0` means "not persisted yet"; the store assigns ids on insert.
//! - Foreign keys are plain ids and must point at persisted rows.
//! - Sensitive byte fields hold plaintext in memory; encryption happens
//!   only at the storage boundary.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cluster;
pub mod git_repo;
pub mod helm_repo;
pub mod infra;
pub mod integrations;
pub mod invite;
pub mod project;
pub mod registry;
pub mod release;
pub mod user;

/// Store-assigned row identifier.
pub type RecordId = i64;

/// Record-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    InvalidEmail {
        entity: &'static str,
        value: String,
    },
    MissingReference {
        entity: &'static str,
        field: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => write!(f, "{entity}.{field} must not be empty"),
            Self::InvalidEmail { entity, value } => {
                write!(f, "{entity}.email `{value}` is not a valid email address")
            }
            Self::MissingReference { entity, field } => {
                write!(f, "{entity}.{field} must reference a persisted record")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}

pub(crate) fn require_bytes(
    entity: &'static str,
    field: &'static str,
    value: &[u8],
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}

pub(crate) fn require_reference(
    entity: &'static str,
    field: &'static str,
    id: RecordId,
) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::MissingReference { entity, field });
    }
    Ok(())
}

pub(crate) fn require_optional_reference(
    entity: &'static str,
    field: &'static str,
    id: Option<RecordId>,
) -> Result<(), ValidationError> {
    match id {
        Some(id) => require_reference(entity, field, id),
        None => Ok(()),
    }
}

pub(crate) fn require_email(entity: &'static str, value: &str) -> Result<(), ValidationError> {
    require_text(entity, "email", value)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(ValidationError::InvalidEmail {
            entity,
            value: value.to_string(),
        });
    }
    Ok(())
}
