//! Graph resolver: rebuilds the shared entity graph from a record tree.
//!
//! # Responsibility
//! - Walk the record tree in dependency order: tags, contacts, events,
//!   then the root user.
//! - Keep load-scoped resolution tables so every tag key and contact
//!   position maps to exactly one instance.
//!
//! # Invariants
//! - Each stage only references entities built by an earlier stage.
//! - Unresolvable keys and positions fail the whole load; nothing is
//!   substituted or skipped.
//! - The resolver is consumed by `finish`, so tables and partially linked
//!   entities never outlive one load call.

use crate::cache::{ContactCache, EventCache, NoteCache, TagCache};
use crate::model::contact::{Contact, ContactList, ContactRef};
use crate::model::event::{Event, EventList};
use crate::model::tag::{Tag, TagHandler, TagRef};
use crate::model::user::User;
use crate::model::validation::{validate_stable_id, ValidationError};
use crate::store::record::{ContactRecord, EventRecord, NoteRecord, TagRecord, UserRecord};
use log::debug;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use uuid::Uuid;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Position of a record inside the document, for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLocation {
    Root,
    Tag(String),
    /// Index into `contactObjects`.
    Contact(usize),
    /// Index into `events`.
    Event(usize),
    /// Index into the root `contacts` membership list.
    Membership(usize),
}

impl Display for RecordLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Tag(key) => write!(f, "tags[\"{key}\"]"),
            Self::Contact(index) => write!(f, "contactObjects[{index}]"),
            Self::Event(index) => write!(f, "events[{index}]"),
            Self::Membership(index) => write!(f, "contacts[{index}]"),
        }
    }
}

/// Fatal load error raised while linking records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A tag section key differs from the name stored in its record.
    KeyMismatch { key: String, name: String },
    /// A record references a tag key missing from the tag section.
    DanglingTag { location: RecordLocation, key: String },
    /// A record references a contact position that was never resolved.
    DanglingContact {
        location: RecordLocation,
        position: usize,
        resolved: usize,
    },
    /// Two records share one stable id.
    DuplicateStableId { location: RecordLocation, id: Uuid },
    /// A record holds values the domain rejects.
    InvalidRecord {
        location: RecordLocation,
        source: ValidationError,
    },
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyMismatch { key, name } => {
                write!(f, "tag section key `{key}` holds a tag named `{name}`")
            }
            Self::DanglingTag { location, key } => {
                write!(f, "{location} references unknown tag `{key}`")
            }
            Self::DanglingContact {
                location,
                position,
                resolved,
            } => write!(
                f,
                "{location} references contact position {position}, but only {resolved} contacts are resolved"
            ),
            Self::DuplicateStableId { location, id } => {
                write!(f, "{location} reuses stable id {id}")
            }
            Self::InvalidRecord { location, source } => write!(f, "{location} is invalid: {source}"),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRecord { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Rebuilds a user graph from its record tree.
pub fn resolve_user(record: UserRecord) -> ResolveResult<User> {
    let UserRecord {
        name,
        tags,
        contacts,
        contact_objects,
        events,
        uuid,
    } = record;

    let mut resolver = Resolver::default();
    resolver.resolve_tags(tags)?;
    resolver.resolve_contacts(contact_objects)?;
    let events = resolver.resolve_events(events)?;
    resolver.finish(uuid, name, &contacts, events)
}

/// Load-scoped resolution tables.
#[derive(Default)]
struct Resolver {
    tags: BTreeMap<String, TagRef>,
    contacts: Vec<ContactRef>,
}

impl Resolver {
    fn resolve_tags(&mut self, records: BTreeMap<String, TagRecord>) -> ResolveResult<()> {
        for (key, record) in records {
            if key != record.name {
                return Err(ResolveError::KeyMismatch {
                    key,
                    name: record.name,
                });
            }
            let location = RecordLocation::Tag(key.clone());
            let tag = Tag::restore(TagCache {
                name: record.name,
                color: record.color,
            })
            .map_err(|source| ResolveError::InvalidRecord { location, source })?;
            self.tags.insert(key, Rc::new(RefCell::new(tag)));
        }
        debug!(
            "event=resolve_tags module=store status=ok count={}",
            self.tags.len()
        );
        Ok(())
    }

    fn resolve_contacts(&mut self, records: Vec<ContactRecord>) -> ResolveResult<()> {
        let mut seen = HashSet::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let location = RecordLocation::Contact(index);
            if !seen.insert(record.stable_id) {
                return Err(ResolveError::DuplicateStableId {
                    location,
                    id: record.stable_id,
                });
            }
            let tags = record
                .tags
                .iter()
                .map(|key| self.lookup_tag(&location, key))
                .collect::<ResolveResult<Vec<_>>>()?;
            let cache = ContactCache {
                id: record.stable_id,
                name: record.name,
                phone_number: record.phone_number,
                address: record.address,
                notes: record.notes.into_iter().map(note_cache).collect(),
                tags: record.tags,
            };
            let contact = Contact::restore(cache, tags)
                .map_err(|source| ResolveError::InvalidRecord { location, source })?;
            self.contacts.push(contact.into_ref());
        }
        debug!(
            "event=resolve_contacts module=store status=ok count={}",
            self.contacts.len()
        );
        Ok(())
    }

    fn resolve_events(&self, records: Vec<EventRecord>) -> ResolveResult<EventList> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut events = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let location = RecordLocation::Event(index);
            if !seen.insert(record.stable_id) {
                return Err(ResolveError::DuplicateStableId {
                    location,
                    id: record.stable_id,
                });
            }
            let tag = record
                .tag
                .as_deref()
                .map(|key| self.lookup_tag(&location, key))
                .transpose()?;
            let contacts = record
                .contacts
                .iter()
                .map(|&position| self.lookup_contact(&location, position))
                .collect::<ResolveResult<Vec<_>>>()?;
            let cache = EventCache {
                id: record.stable_id,
                name: record.name,
                address: record.address,
                date_time: record.date_time,
                description: record.description,
                tag: record.tag,
                contacts: contacts.iter().map(|contact| contact.borrow().id()).collect(),
            };
            let event = Event::restore(cache, tag, contacts)
                .map_err(|source| ResolveError::InvalidRecord { location, source })?;
            events.push(event);
        }
        debug!(
            "event=resolve_events module=store status=ok count={}",
            events.len()
        );
        Ok(events.into_iter().collect())
    }

    fn finish(
        self,
        id: Uuid,
        name: String,
        membership: &[usize],
        events: EventList,
    ) -> ResolveResult<User> {
        validate_stable_id(id).map_err(|source| ResolveError::InvalidRecord {
            location: RecordLocation::Root,
            source,
        })?;

        let mut contacts = ContactList::new();
        for (index, &position) in membership.iter().enumerate() {
            let contact = self.lookup_contact(&RecordLocation::Membership(index), position)?;
            contacts.push(contact);
        }

        let tag_handler = TagHandler::from_resolved(self.tags);
        Ok(User::from_parts(id, name, contacts, events, tag_handler))
    }

    fn lookup_tag(&self, location: &RecordLocation, key: &str) -> ResolveResult<TagRef> {
        self.tags
            .get(key)
            .cloned()
            .ok_or_else(|| ResolveError::DanglingTag {
                location: location.clone(),
                key: key.to_string(),
            })
    }

    fn lookup_contact(&self, location: &RecordLocation, position: usize) -> ResolveResult<ContactRef> {
        self.contacts
            .get(position)
            .cloned()
            .ok_or_else(|| ResolveError::DanglingContact {
                location: location.clone(),
                position,
                resolved: self.contacts.len(),
            })
    }
}

fn note_cache(record: NoteRecord) -> NoteCache {
    NoteCache {
        created_at: record.created_at,
        text: record.text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn contact_record(name: &str, tags: &[&str]) -> ContactRecord {
        ContactRecord {
            name: name.to_string(),
            phone_number: String::new(),
            address: String::new(),
            notes: Vec::new(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            stable_id: Uuid::new_v4(),
        }
    }

    fn event_record(contacts: Vec<usize>, tag: Option<&str>) -> EventRecord {
        EventRecord {
            name: "Event".to_string(),
            address: String::new(),
            date_time: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            description: String::new(),
            tag: tag.map(str::to_string),
            contacts,
            stable_id: Uuid::new_v4(),
        }
    }

    fn user_record() -> UserRecord {
        UserRecord {
            name: "owner".to_string(),
            tags: BTreeMap::new(),
            contacts: Vec::new(),
            contact_objects: Vec::new(),
            events: Vec::new(),
            uuid: Uuid::new_v4(),
        }
    }

    #[test]
    fn membership_position_out_of_range_is_dangling() {
        let mut record = user_record();
        record.contact_objects.push(contact_record("A", &[]));
        record.contacts = vec![0, 1];

        let err = resolve_user(record).unwrap_err();
        assert_eq!(
            err,
            ResolveError::DanglingContact {
                location: RecordLocation::Membership(1),
                position: 1,
                resolved: 1,
            }
        );
    }

    #[test]
    fn event_tag_key_must_exist() {
        let mut record = user_record();
        record.events.push(event_record(Vec::new(), Some("ghost")));

        let err = resolve_user(record).unwrap_err();
        assert_eq!(
            err,
            ResolveError::DanglingTag {
                location: RecordLocation::Event(0),
                key: "ghost".to_string(),
            }
        );
        assert_eq!(err.to_string(), "events[0] references unknown tag `ghost`");
    }

    #[test]
    fn tag_key_must_match_record_name() {
        let mut record = user_record();
        record.tags.insert(
            "work".to_string(),
            TagRecord {
                name: "office".to_string(),
                color: "ffffff".to_string(),
            },
        );

        assert!(matches!(
            resolve_user(record),
            Err(ResolveError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn duplicate_contact_stable_ids_are_rejected() {
        let mut record = user_record();
        let first = contact_record("A", &[]);
        let mut second = contact_record("B", &[]);
        second.stable_id = first.stable_id;
        record.contact_objects = vec![first, second];

        assert!(matches!(
            resolve_user(record),
            Err(ResolveError::DuplicateStableId {
                location: RecordLocation::Contact(1),
                ..
            })
        ));
    }

    #[test]
    fn invalid_contact_name_reports_location() {
        let mut record = user_record();
        record.contact_objects.push(contact_record("", &[]));

        assert_eq!(
            resolve_user(record).unwrap_err(),
            ResolveError::InvalidRecord {
                location: RecordLocation::Contact(0),
                source: ValidationError::EmptyContactName,
            }
        );
    }

    #[test]
    fn shared_contact_and_tag_resolve_to_one_instance() {
        let mut record = user_record();
        record.tags.insert(
            "vip".to_string(),
            TagRecord {
                name: "vip".to_string(),
                color: "ff00ff".to_string(),
            },
        );
        record.contact_objects.push(contact_record("A", &["vip"]));
        record.contacts = vec![0];
        record.events.push(event_record(vec![0], Some("vip")));
        record.events.push(event_record(vec![0], None));

        let user = resolve_user(record).unwrap();
        let listed = user.contacts().get(0).unwrap();
        let events: Vec<&Event> = user.events().iter().collect();
        assert!(Rc::ptr_eq(listed, &events[0].contacts()[0]));
        assert!(Rc::ptr_eq(listed, &events[1].contacts()[0]));

        let tag = user.tag("vip").unwrap();
        assert!(Rc::ptr_eq(&tag, &listed.borrow().tags()[0]));
        assert!(Rc::ptr_eq(&tag, events[0].tag().unwrap()));
    }
}
