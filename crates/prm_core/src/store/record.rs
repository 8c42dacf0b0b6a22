//! Persisted record schema: the on-disk document shape.
//!
//! # Responsibility
//! - Define the serde wire format of one user document.
//!
//! # Invariants
//! - Each tag is stored once, in `UserRecord::tags`, keyed by name.
//! - Each contact is stored once, in `UserRecord::contact_objects`.
//! - Every other reference is a tag name key or a position into
//!   `contact_objects`; nothing is embedded twice.
//! - Field names are camelCase; `EventRecord::tag` is omitted when absent.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Root document record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub name: String,
    /// Tag section keyed by tag name.
    pub tags: BTreeMap<String, TagRecord>,
    /// Positions into `contact_objects` forming the user's contact list.
    pub contacts: Vec<usize>,
    /// Every contact reachable from the user, stored once each.
    pub contact_objects: Vec<ContactRecord>,
    pub events: Vec<EventRecord>,
    pub uuid: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    /// ISO-8601 local date-time.
    pub created_at: NaiveDateTime,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub name: String,
    pub phone_number: String,
    pub address: String,
    #[serde(default)]
    pub notes: Vec<NoteRecord>,
    /// Tag name keys into `UserRecord::tags`.
    #[serde(default)]
    pub tags: Vec<String>,
    pub stable_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub name: String,
    pub address: String,
    /// ISO-8601 local date-time.
    pub date_time: NaiveDateTime,
    pub description: String,
    /// Tag name key into `UserRecord::tags`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Positions into `UserRecord::contact_objects`.
    #[serde(default)]
    pub contacts: Vec<usize>,
    pub stable_id: Uuid,
}
