//! Event entity and the user's event list.
//!
//! # Invariants
//! - An event holds at most one tag.
//! - An event holds each contact instance at most once.
//! - `id` is stable across save/load.

use crate::cache::EventCache;
use crate::model::contact::ContactRef;
use crate::model::tag::TagRef;
use crate::model::validation::{validate_stable_id, ValidationError};
use crate::model::EventId;
use crate::search::Searchable;
use chrono::{Local, NaiveDateTime};
use std::rc::Rc;
use uuid::Uuid;

/// Something happening at a point in time, past or future.
#[derive(Debug)]
pub struct Event {
    id: EventId,
    name: String,
    address: String,
    date_time: NaiveDateTime,
    description: String,
    tag: Option<TagRef>,
    contacts: Vec<ContactRef>,
}

impl Event {
    pub fn new(name: impl Into<String>, date_time: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: String::new(),
            date_time,
            description: String::new(),
            tag: None,
            contacts: Vec::new(),
        }
    }

    /// Rebuilds an event from its snapshot and already resolved references.
    pub fn restore(
        cache: EventCache,
        tag: Option<TagRef>,
        contacts: Vec<ContactRef>,
    ) -> Result<Self, ValidationError> {
        validate_stable_id(cache.id)?;
        let mut event = Self {
            id: cache.id,
            name: cache.name,
            address: cache.address,
            date_time: cache.date_time,
            description: cache.description,
            tag,
            contacts: Vec::with_capacity(contacts.len()),
        };
        for contact in contacts {
            event.add_contact(contact);
        }
        Ok(event)
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    pub fn date_time(&self) -> NaiveDateTime {
        self.date_time
    }

    pub fn set_date_time(&mut self, date_time: NaiveDateTime) {
        self.date_time = date_time;
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn is_in_future(&self) -> bool {
        self.date_time > Local::now().naive_local()
    }

    pub fn tag(&self) -> Option<&TagRef> {
        self.tag.as_ref()
    }

    /// Sets the tag, replacing any previous one.
    pub fn set_tag(&mut self, tag: TagRef) {
        self.tag = Some(tag);
    }

    pub fn clear_tag(&mut self) -> Option<TagRef> {
        self.tag.take()
    }

    pub fn contacts(&self) -> &[ContactRef] {
        &self.contacts
    }

    /// Adds a contact. Returns `false` if this instance was already held.
    pub fn add_contact(&mut self, contact: ContactRef) -> bool {
        if self.has_contact(&contact) {
            return false;
        }
        self.contacts.push(contact);
        true
    }

    pub fn remove_contact(&mut self, contact: &ContactRef) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|held| !Rc::ptr_eq(held, contact));
        before != self.contacts.len()
    }

    pub fn has_contact(&self, contact: &ContactRef) -> bool {
        self.contacts.iter().any(|held| Rc::ptr_eq(held, contact))
    }

    pub fn snapshot(&self) -> EventCache {
        EventCache {
            id: self.id,
            name: self.name.clone(),
            address: self.address.clone(),
            date_time: self.date_time,
            description: self.description.clone(),
            tag: self.tag.as_ref().map(|tag| tag.borrow().name().to_string()),
            contacts: self
                .contacts
                .iter()
                .map(|contact| contact.borrow().id())
                .collect(),
        }
    }
}

impl Searchable for Event {
    fn search_key(&self) -> String {
        self.name.clone()
    }
}

/// The user's events, in insertion order.
#[derive(Debug, Default)]
pub struct EventList {
    events: Vec<Event>,
}

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    ///
    /// # Errors
    /// - Hands the event back when another event already uses its id.
    pub fn add(&mut self, event: Event) -> Result<EventId, Event> {
        if self.get(event.id).is_some() {
            return Err(event);
        }
        let id = event.id;
        self.events.push(event);
        Ok(id)
    }

    pub fn remove(&mut self, id: EventId) -> Option<Event> {
        let position = self.events.iter().position(|event| event.id == id)?;
        Some(self.events.remove(position))
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn get_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.events.iter_mut().find(|event| event.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Event> {
        self.events.iter_mut()
    }

    /// Events sorted by date-time, earliest first.
    pub fn chronological(&self) -> Vec<&Event> {
        let mut sorted: Vec<&Event> = self.events.iter().collect();
        sorted.sort_by_key(|event| event.date_time);
        sorted
    }
}

impl FromIterator<Event> for EventList {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}
