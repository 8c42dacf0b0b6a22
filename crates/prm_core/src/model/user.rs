//! Root aggregate of one document.
//!
//! # Responsibility
//! - Own the contact list, the event list and the tag handler.
//! - Offer graph-level mutations that must touch several collections at
//!   once (tag deletion, contact removal).
//!
//! # Invariants
//! - Exactly one `User` per document.
//! - The user is the sole owner of its collections and its `TagHandler`.

use crate::cache::{ContactCache, UserCache};
use crate::model::contact::{Contact, ContactList, ContactRef};
use crate::model::event::{Event, EventList};
use crate::model::tag::{TagError, TagHandler, TagRef};
use crate::model::validation::ValidationError;
use crate::model::{ContactId, UserId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use uuid::Uuid;

/// Error for user-level mutations that combine validation and tag lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    Validation(ValidationError),
    Tag(TagError),
    /// A contact with this stable id is already part of the graph.
    DuplicateStableId(ContactId),
}

impl Display for UserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Tag(err) => write!(f, "{err}"),
            Self::DuplicateStableId(id) => {
                write!(f, "a contact with stable id {id} already exists")
            }
        }
    }
}

impl Error for UserError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Tag(err) => Some(err),
            Self::DuplicateStableId(_) => None,
        }
    }
}

impl From<ValidationError> for UserError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TagError> for UserError {
    fn from(value: TagError) -> Self {
        Self::Tag(value)
    }
}

#[derive(Debug)]
pub struct User {
    id: UserId,
    name: String,
    contacts: ContactList,
    events: EventList,
    tag_handler: TagHandler,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            contacts: ContactList::new(),
            events: EventList::new(),
            tag_handler: TagHandler::new(),
        }
    }

    /// Assembles a user from fully resolved parts.
    pub(crate) fn from_parts(
        id: UserId,
        name: String,
        contacts: ContactList,
        events: EventList,
        tag_handler: TagHandler,
    ) -> Self {
        Self {
            id,
            name,
            contacts,
            events,
            tag_handler,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn contacts(&self) -> &ContactList {
        &self.contacts
    }

    pub fn contacts_mut(&mut self) -> &mut ContactList {
        &mut self.contacts
    }

    pub fn events(&self) -> &EventList {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventList {
        &mut self.events
    }

    pub fn tag_handler(&self) -> &TagHandler {
        &self.tag_handler
    }

    /// Events that reference this exact contact instance.
    pub fn contact_events(&self, contact: &ContactRef) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|event| event.has_contact(contact))
            .collect()
    }

    /// Finds a contact by stable id, in the contact list or held by an event.
    pub fn find_contact(&self, id: ContactId) -> Option<ContactRef> {
        self.contacts.find_by_id(id).or_else(|| {
            self.events
                .iter()
                .flat_map(|event| event.contacts())
                .find(|contact| contact.borrow().id() == id)
                .cloned()
        })
    }

    /// Adds a contact described by a snapshot, resolving its tag keys
    /// against this user's tags.
    ///
    /// Nothing is mutated when the stable id is already taken, a tag key is
    /// unknown or the snapshot is invalid.
    pub fn add_contact_from_cache(&mut self, cache: ContactCache) -> Result<ContactRef, UserError> {
        if self.find_contact(cache.id).is_some() {
            return Err(UserError::DuplicateStableId(cache.id));
        }
        let tags = cache
            .tags
            .iter()
            .map(|name| self.tag_handler.tag(name))
            .collect::<Result<Vec<_>, _>>()?;
        let contact = Contact::restore(cache, tags)?.into_ref();
        self.contacts.push(Rc::clone(&contact));
        Ok(contact)
    }

    /// Removes a contact from the list and from every event holding it.
    pub fn remove_contact(&mut self, contact: &ContactRef) -> bool {
        let listed = self.contacts.remove(contact);
        let mut referenced = false;
        for event in self.events.iter_mut() {
            referenced |= event.remove_contact(contact);
        }
        listed || referenced
    }

    pub fn create_tag(&mut self, name: &str) -> Result<TagRef, TagError> {
        self.tag_handler.create_tag(name)
    }

    pub fn get_or_create_tag(&mut self, name: &str) -> Result<TagRef, TagError> {
        self.tag_handler.get_or_create(name)
    }

    pub fn tag(&self, name: &str) -> Result<TagRef, TagError> {
        self.tag_handler.tag(name)
    }

    pub fn tags(&self) -> Vec<TagRef> {
        self.tag_handler.tags()
    }

    pub fn rename_tag(&mut self, old_name: &str, new_name: &str) -> Result<(), TagError> {
        self.tag_handler.rename(old_name, new_name)
    }

    pub fn set_tag_color(&mut self, name: &str, color: &str) -> Result<(), TagError> {
        self.tag_handler.set_color(name, color)
    }

    /// Unregisters a tag and detaches it from every contact and event.
    pub fn delete_tag(&mut self, name: &str) -> Result<(), TagError> {
        let tag = self.tag_handler.delete(name)?;
        for contact in self.contacts.iter() {
            contact.borrow_mut().remove_tag(&tag);
        }
        for event in self.events.iter_mut() {
            if event.tag().is_some_and(|held| Rc::ptr_eq(held, &tag)) {
                event.clear_tag();
            }
            for contact in event.contacts() {
                contact.borrow_mut().remove_tag(&tag);
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> UserCache {
        UserCache {
            id: self.id,
            name: self.name.clone(),
            tags: self.tag_handler.snapshot(),
            contacts: self
                .contacts
                .iter()
                .map(|contact| contact.borrow().id())
                .collect(),
            events: self.events.iter().map(Event::snapshot).collect(),
        }
    }
}
