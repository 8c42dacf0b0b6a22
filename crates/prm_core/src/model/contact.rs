//! Contact entity and the user's contact list.
//!
//! # Responsibility
//! - Hold contact fields, owned notes and shared tag references.
//! - Provide identity-based membership for the contact list.
//!
//! # Invariants
//! - `name` is never blank.
//! - `id` is stable for the contact's lifetime and across save/load.
//! - A contact holds each tag instance at most once (identity, not value).

use crate::cache::ContactCache;
use crate::model::notes::{Note, Notes};
use crate::model::tag::TagRef;
use crate::model::validation::{validate_contact_name, validate_stable_id, ValidationError};
use crate::model::ContactId;
use crate::search::Searchable;
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// Shared handle to one contact. Identity is the allocation.
pub type ContactRef = Rc<RefCell<Contact>>;

#[derive(Debug)]
pub struct Contact {
    id: ContactId,
    name: String,
    phone_number: String,
    address: String,
    notes: Notes,
    tags: Vec<TagRef>,
}

impl Contact {
    /// Creates a contact with a generated stable id.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a contact with a caller-provided stable id.
    pub fn with_id(id: ContactId, name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_stable_id(id)?;
        validate_contact_name(&name)?;
        Ok(Self {
            id,
            name,
            phone_number: String::new(),
            address: String::new(),
            notes: Notes::new(),
            tags: Vec::new(),
        })
    }

    /// Rebuilds a contact from its snapshot.
    ///
    /// `tags` are the instances the snapshot's tag keys resolved to; the
    /// keys in `cache.tags` are not consulted.
    pub fn restore(cache: ContactCache, tags: Vec<TagRef>) -> Result<Self, ValidationError> {
        let mut contact = Self::with_id(cache.id, cache.name)?;
        contact.phone_number = cache.phone_number;
        contact.address = cache.address;
        contact.notes = cache.notes.into_iter().map(Note::from).collect();
        for tag in tags {
            contact.add_tag(tag);
        }
        Ok(contact)
    }

    pub fn into_ref(self) -> ContactRef {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> ContactId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        let name = name.into();
        validate_contact_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn set_phone_number(&mut self, phone_number: impl Into<String>) {
        self.phone_number = phone_number.into();
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    pub fn notes(&self) -> &Notes {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut Notes {
        &mut self.notes
    }

    pub fn tags(&self) -> &[TagRef] {
        &self.tags
    }

    /// Adds a tag. Returns `false` if this instance was already held.
    pub fn add_tag(&mut self, tag: TagRef) -> bool {
        if self.has_tag(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove_tag(&mut self, tag: &TagRef) -> bool {
        let before = self.tags.len();
        self.tags.retain(|held| !Rc::ptr_eq(held, tag));
        before != self.tags.len()
    }

    pub fn has_tag(&self, tag: &TagRef) -> bool {
        self.tags.iter().any(|held| Rc::ptr_eq(held, tag))
    }

    pub fn snapshot(&self) -> ContactCache {
        ContactCache {
            id: self.id,
            name: self.name.clone(),
            phone_number: self.phone_number.clone(),
            address: self.address.clone(),
            notes: self.notes.snapshot(),
            tags: self
                .tags
                .iter()
                .map(|tag| tag.borrow().name().to_string())
                .collect(),
        }
    }
}

impl Searchable for Contact {
    fn search_key(&self) -> String {
        self.name.clone()
    }
}

impl Searchable for ContactRef {
    fn search_key(&self) -> String {
        self.borrow().search_key()
    }
}

/// Ordered list of the user's contacts.
#[derive(Debug, Default)]
pub struct ContactList {
    contacts: Vec<ContactRef>,
}

impl ContactList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a contact named `name` and appends it.
    pub fn add_contact(&mut self, name: &str) -> Result<ContactRef, ValidationError> {
        let contact = Contact::new(name)?.into_ref();
        self.contacts.push(Rc::clone(&contact));
        Ok(contact)
    }

    /// Appends an existing instance. Returns `false` if it is already listed.
    pub fn push(&mut self, contact: ContactRef) -> bool {
        if self.contains(&contact) {
            return false;
        }
        self.contacts.push(contact);
        true
    }

    pub fn remove(&mut self, contact: &ContactRef) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|listed| !Rc::ptr_eq(listed, contact));
        before != self.contacts.len()
    }

    pub fn contains(&self, contact: &ContactRef) -> bool {
        self.contacts.iter().any(|listed| Rc::ptr_eq(listed, contact))
    }

    pub fn get(&self, index: usize) -> Option<&ContactRef> {
        self.contacts.get(index)
    }

    pub fn find_by_id(&self, id: ContactId) -> Option<ContactRef> {
        self.contacts
            .iter()
            .find(|contact| contact.borrow().id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactRef> {
        self.contacts.iter()
    }

    /// Copy of the handles, for callers that need an owned list.
    pub fn to_vec(&self) -> Vec<ContactRef> {
        self.contacts.clone()
    }
}
