//! Domain entities of the contact/event graph.
//!
//! # Responsibility
//! - Define mutable, identity-bearing business objects and their invariants.
//! - Describe themselves as cache snapshots without knowing the document
//!   format.
//!
//! # Invariants
//! - Tags and contacts are shared through `Rc<RefCell<_>>`; identity is the
//!   allocation, compared with `Rc::ptr_eq`.
//! - Notes and events are owned by value by exactly one parent.

pub mod contact;
pub mod event;
pub mod notes;
pub mod tag;
pub mod user;
pub mod validation;

/// Stable identifier of a contact; also the attachment store key.
pub type ContactId = uuid::Uuid;
/// Stable identifier of an event.
pub type EventId = uuid::Uuid;
/// Stable identifier of the root user.
pub type UserId = uuid::Uuid;
