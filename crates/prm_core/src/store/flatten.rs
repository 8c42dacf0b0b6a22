//! Flattening: turns the live graph into a record tree.
//!
//! # Responsibility
//! - Emit each distinct contact exactly once and replace every reference
//!   to it with its position in `contactObjects`.
//! - Replace tag references with tag name keys.
//!
//! # Invariants
//! - Contacts are deduplicated by instance identity, not by value.
//! - Positions are assigned in first-encounter order: the contact list
//!   first, then contacts only reachable through events.
//! - Every referenced tag must be the instance registered in the user's
//!   tag handler; otherwise the save fails.
//! - Contact and event stable ids are unique in the emitted record, so a
//!   saved document always resolves again.

use crate::cache::{ContactCache, EventCache, TagCache};
use crate::model::contact::ContactRef;
use crate::model::user::User;
use crate::model::{ContactId, EventId};
use crate::store::record::{ContactRecord, EventRecord, NoteRecord, TagRecord, UserRecord};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type FlattenResult<T> = Result<T, FlattenError>;

/// Fatal save error: the live graph cannot be expressed as a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlattenError {
    /// A contact or event holds a tag the user's handler does not own.
    UnregisteredTag { owner: String, name: String },
    /// Two distinct contact instances carry the same stable id.
    DuplicateStableId(ContactId),
    /// Two events carry the same stable id.
    DuplicateEventId(EventId),
    /// A contact key was never emitted by the identity walk.
    UnemittedContact(ContactId),
}

impl Display for FlattenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnregisteredTag { owner, name } => {
                write!(f, "`{owner}` holds tag `{name}` which is not registered")
            }
            Self::DuplicateStableId(id) => {
                write!(f, "distinct contacts share stable id {id}")
            }
            Self::DuplicateEventId(id) => write!(f, "events share stable id {id}"),
            Self::UnemittedContact(id) => write!(f, "contact {id} was not emitted"),
        }
    }
}

impl Error for FlattenError {}

/// Flattens a user graph into its document record.
pub fn flatten_user(user: &User) -> FlattenResult<UserRecord> {
    check_tag_ownership(user)?;
    check_event_ids(user)?;

    let mut emitter = ContactEmitter::default();
    for contact in user.contacts().iter() {
        emitter.visit(contact)?;
    }
    for event in user.events().iter() {
        for contact in event.contacts() {
            emitter.visit(contact)?;
        }
    }

    let snapshot = user.snapshot();
    let contacts = snapshot
        .contacts
        .iter()
        .map(|id| emitter.position_of(*id))
        .collect::<FlattenResult<Vec<_>>>()?;
    let events = snapshot
        .events
        .into_iter()
        .map(|event| event_record(event, &emitter))
        .collect::<FlattenResult<Vec<_>>>()?;

    Ok(UserRecord {
        name: snapshot.name,
        tags: tag_section(snapshot.tags),
        contacts,
        contact_objects: emitter.records,
        events,
        uuid: snapshot.id,
    })
}

/// Identity-keyed table of contacts already emitted.
#[derive(Default)]
struct ContactEmitter {
    by_instance: HashMap<*const (), usize>,
    by_id: HashMap<ContactId, usize>,
    records: Vec<ContactRecord>,
}

impl ContactEmitter {
    fn visit(&mut self, contact: &ContactRef) -> FlattenResult<usize> {
        let key = instance_key(contact);
        if let Some(&position) = self.by_instance.get(&key) {
            return Ok(position);
        }

        let cache = contact.borrow().snapshot();
        if self.by_id.contains_key(&cache.id) {
            return Err(FlattenError::DuplicateStableId(cache.id));
        }

        let position = self.records.len();
        self.by_instance.insert(key, position);
        self.by_id.insert(cache.id, position);
        self.records.push(contact_record(cache));
        Ok(position)
    }

    fn position_of(&self, id: ContactId) -> FlattenResult<usize> {
        self.by_id
            .get(&id)
            .copied()
            .ok_or(FlattenError::UnemittedContact(id))
    }
}

fn instance_key(contact: &ContactRef) -> *const () {
    std::rc::Rc::as_ptr(contact).cast()
}

fn check_tag_ownership(user: &User) -> FlattenResult<()> {
    let handler = user.tag_handler();
    let event_contacts = user.events().iter().flat_map(|event| event.contacts());
    for contact in user.contacts().iter().chain(event_contacts) {
        let contact = contact.borrow();
        for tag in contact.tags() {
            if !handler.is_registered(tag) {
                return Err(FlattenError::UnregisteredTag {
                    owner: contact.name().to_string(),
                    name: tag.borrow().name().to_string(),
                });
            }
        }
    }
    for event in user.events().iter() {
        if let Some(tag) = event.tag() {
            if !handler.is_registered(tag) {
                return Err(FlattenError::UnregisteredTag {
                    owner: event.name().to_string(),
                    name: tag.borrow().name().to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_event_ids(user: &User) -> FlattenResult<()> {
    let mut seen = HashSet::with_capacity(user.events().len());
    for event in user.events().iter() {
        if !seen.insert(event.id()) {
            return Err(FlattenError::DuplicateEventId(event.id()));
        }
    }
    Ok(())
}

fn tag_section(tags: Vec<TagCache>) -> BTreeMap<String, TagRecord> {
    tags.into_iter()
        .map(|tag| {
            (
                tag.name.clone(),
                TagRecord {
                    name: tag.name,
                    color: tag.color,
                },
            )
        })
        .collect()
}

fn contact_record(cache: ContactCache) -> ContactRecord {
    ContactRecord {
        name: cache.name,
        phone_number: cache.phone_number,
        address: cache.address,
        notes: cache
            .notes
            .into_iter()
            .map(|note| NoteRecord {
                created_at: note.created_at,
                text: note.text,
            })
            .collect(),
        tags: cache.tags,
        stable_id: cache.id,
    }
}

fn event_record(cache: EventCache, emitter: &ContactEmitter) -> FlattenResult<EventRecord> {
    let contacts = cache
        .contacts
        .iter()
        .map(|id| emitter.position_of(*id))
        .collect::<FlattenResult<Vec<_>>>()?;
    Ok(EventRecord {
        name: cache.name,
        address: cache.address,
        date_time: cache.date_time,
        description: cache.description,
        tag: cache.tag,
        contacts,
        stable_id: cache.id,
    })
}
