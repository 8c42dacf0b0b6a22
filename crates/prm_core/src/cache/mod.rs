//! Cache snapshots: flat value mirrors of domain entities.
//!
//! # Responsibility
//! - Describe one entity's state at the moment of a save, by value only.
//! - Decouple entities from the persisted document shape.
//!
//! # Invariants
//! - Snapshots never hold a live handle into the entity graph.
//! - Exclusively owned children (notes) are nested by value.
//! - Shared references become lookup keys: tags by name, contacts by
//!   stable id.
//! - Snapshots carry no behavior; they exist only for the length of one
//!   save or import.

use crate::model::{ContactId, EventId, UserId};
use chrono::NaiveDateTime;

/// Snapshot of one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCache {
    pub name: String,
    /// Hex triplet without a leading `#`.
    pub color: String,
}

/// Snapshot of one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCache {
    pub created_at: NaiveDateTime,
    pub text: String,
}

/// Snapshot of one contact including its owned notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactCache {
    pub id: ContactId,
    pub name: String,
    pub phone_number: String,
    pub address: String,
    /// Ordered by creation time.
    pub notes: Vec<NoteCache>,
    /// Tag name keys.
    pub tags: Vec<String>,
}

impl ContactCache {
    /// Creates an empty snapshot with a freshly generated stable id.
    ///
    /// Used by import paths that build contacts outside the live graph.
    pub fn with_fresh_id(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: name.into(),
            phone_number: String::new(),
            address: String::new(),
            notes: Vec::new(),
            tags: Vec::new(),
        }
    }
}

/// Snapshot of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCache {
    pub id: EventId,
    pub name: String,
    pub address: String,
    pub date_time: NaiveDateTime,
    pub description: String,
    /// Tag name key, when the event is tagged.
    pub tag: Option<String>,
    /// Stable ids of the referenced contacts.
    pub contacts: Vec<ContactId>,
}

/// Snapshot of the root user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCache {
    pub id: UserId,
    pub name: String,
    pub tags: Vec<TagCache>,
    /// Stable ids of the contacts in the user's contact list, in list order.
    pub contacts: Vec<ContactId>,
    pub events: Vec<EventCache>,
}
