//! Core of the personal relationship manager.
//! Owns the contact/event/tag graph and its JSON document persistence.

pub mod attachment;
pub mod cache;
pub mod config;
pub mod import;
pub mod logging;
pub mod model;
pub mod search;
pub mod statistics;
pub mod store;

pub use attachment::{AttachmentError, AttachmentResult, AttachmentStore};
pub use config::StoreConfig;
pub use import::{ImportError, ImportResult};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::contact::{Contact, ContactList, ContactRef};
pub use model::event::{Event, EventList};
pub use model::notes::{Note, Notes};
pub use model::tag::{Tag, TagError, TagHandler, TagRef, DEFAULT_TAG_COLOR};
pub use model::user::{User, UserError};
pub use model::validation::ValidationError;
pub use model::{ContactId, EventId, UserId};
pub use search::fuzzy::SearchEngine;
pub use search::Searchable;
pub use store::{user_from_json, user_to_json, DocumentStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
