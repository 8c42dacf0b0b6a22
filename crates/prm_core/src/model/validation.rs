//! Input validation shared by domain entities and collaborators.
//!
//! # Responsibility
//! - Reject invalid user input before any state is mutated.
//! - Keep one named condition per rule so callers can match on it.
//!
//! # Invariants
//! - Validators are pure; they never touch entity state.
//! - A color is accepted only as a six digit hex triplet (`RRGGBB`).

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static HEX_TRIPLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{6}$").expect("valid hex triplet regex"));

/// Recoverable rejection of invalid domain input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Contacts must carry a non-blank name.
    EmptyContactName,
    /// Tags must carry a non-blank name.
    EmptyTagName,
    /// Color is not a hex triplet.
    InvalidColor(String),
    /// Attachment category contains something other than letters.
    InvalidCategory(String),
    /// Stable identifiers must never be the nil UUID.
    NilStableId,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContactName => write!(f, "contacts must have a name"),
            Self::EmptyTagName => write!(f, "tags must have a name"),
            Self::InvalidColor(value) => {
                write!(f, "invalid color `{value}`: expected six hex digits")
            }
            Self::InvalidCategory(value) => {
                write!(f, "invalid category `{value}`: only letters are allowed")
            }
            Self::NilStableId => write!(f, "stable id must not be nil"),
        }
    }
}

impl Error for ValidationError {}

/// Checks a contact name.
pub fn validate_contact_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyContactName);
    }
    Ok(())
}

/// Checks a tag name.
pub fn validate_tag_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyTagName);
    }
    Ok(())
}

/// Checks a tag color.
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    if HEX_TRIPLET_RE.is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}

/// Checks a stable identifier.
pub fn validate_stable_id(id: Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::NilStableId);
    }
    Ok(())
}

/// Lower-cases an attachment category and checks it is letters only.
pub fn normalize_category(category: &str) -> Result<String, ValidationError> {
    let lowered = category.to_lowercase();
    if lowered.is_empty() || !lowered.chars().all(char::is_alphabetic) {
        return Err(ValidationError::InvalidCategory(category.to_string()));
    }
    Ok(lowered)
}
