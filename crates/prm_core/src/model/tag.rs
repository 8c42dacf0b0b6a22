//! Tag entity and the handler that owns tag identity.
//!
//! # Responsibility
//! - Keep exactly one live `Tag` instance per name.
//! - Enforce name uniqueness on create and rename.
//!
//! # Invariants
//! - Names are unique among registered tags.
//! - Rename and recolor mutate the existing instance in place, so every
//!   contact/event holding the tag observes the change.
//! - Tag fields are only writable through `TagHandler`.

use crate::cache::TagCache;
use crate::model::validation::{validate_color, validate_tag_name, ValidationError};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Color assigned to tags created without an explicit one.
pub const DEFAULT_TAG_COLOR: &str = "9e9e9e";

/// Shared handle to one tag. Identity is the allocation, see [`Rc::ptr_eq`].
pub type TagRef = Rc<RefCell<Tag>>;

/// Named, colored label shared by contacts and events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    color: String,
}

impl Tag {
    pub(crate) fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_tag_name(&name)?;
        Ok(Self {
            name,
            color: DEFAULT_TAG_COLOR.to_string(),
        })
    }

    /// Rebuilds a tag from its snapshot.
    pub(crate) fn restore(cache: TagCache) -> Result<Self, ValidationError> {
        validate_tag_name(&cache.name)?;
        validate_color(&cache.color)?;
        Ok(Self {
            name: cache.name,
            color: cache.color,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hex triplet without a leading `#`.
    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn snapshot(&self) -> TagCache {
        TagCache {
            name: self.name.clone(),
            color: self.color.clone(),
        }
    }
}

/// Tag handler error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// Another live tag already uses this name.
    NameNotAvailable(String),
    /// No live tag has this name.
    TagNotFound(String),
    Validation(ValidationError),
}

impl Display for TagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameNotAvailable(name) => write!(f, "the name `{name}` is not available"),
            Self::TagNotFound(name) => write!(f, "tag not found: `{name}`"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TagError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for TagError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Owner of the name -> tag mapping for one user.
#[derive(Debug, Default)]
pub struct TagHandler {
    tags: BTreeMap<String, TagRef>,
}

impl TagHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of already resolved tag instances.
    ///
    /// The caller guarantees every key equals its tag's name.
    pub(crate) fn from_resolved(tags: BTreeMap<String, TagRef>) -> Self {
        Self { tags }
    }

    /// Creates and registers a new tag.
    ///
    /// # Errors
    /// - `NameNotAvailable` when a live tag already uses `name`; the handler
    ///   is left unchanged.
    pub fn create_tag(&mut self, name: &str) -> Result<TagRef, TagError> {
        if !self.is_name_available(name) {
            return Err(TagError::NameNotAvailable(name.to_string()));
        }
        let tag = Rc::new(RefCell::new(Tag::new(name)?));
        self.tags.insert(name.to_string(), Rc::clone(&tag));
        Ok(tag)
    }

    /// Returns the tag registered under `name`, creating it when absent.
    pub fn get_or_create(&mut self, name: &str) -> Result<TagRef, TagError> {
        match self.tags.get(name) {
            Some(tag) => Ok(Rc::clone(tag)),
            None => self.create_tag(name),
        }
    }

    pub fn tag(&self, name: &str) -> Result<TagRef, TagError> {
        self.tags
            .get(name)
            .cloned()
            .ok_or_else(|| TagError::TagNotFound(name.to_string()))
    }

    /// All registered tags ordered by name.
    pub fn tags(&self) -> Vec<TagRef> {
        self.tags.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn is_name_available(&self, name: &str) -> bool {
        !self.tags.contains_key(name)
    }

    /// Whether this exact instance is the one registered under its name.
    pub fn is_registered(&self, tag: &TagRef) -> bool {
        let name = tag.borrow().name.clone();
        self.tags
            .get(&name)
            .is_some_and(|registered| Rc::ptr_eq(registered, tag))
    }

    /// Renames a tag in place.
    ///
    /// Holders of the tag keep the same instance and observe the new name.
    ///
    /// # Errors
    /// - `TagNotFound` when `old_name` is not registered.
    /// - `NameNotAvailable` when `new_name` is taken by another tag.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<(), TagError> {
        validate_tag_name(new_name)?;
        let tag = self.tag(old_name)?;
        if old_name == new_name {
            return Ok(());
        }
        if !self.is_name_available(new_name) {
            return Err(TagError::NameNotAvailable(new_name.to_string()));
        }
        self.tags.remove(old_name);
        tag.borrow_mut().name = new_name.to_string();
        self.tags.insert(new_name.to_string(), tag);
        Ok(())
    }

    /// Changes a tag color in place.
    pub fn set_color(&mut self, name: &str, color: &str) -> Result<(), TagError> {
        validate_color(color)?;
        let tag = self.tag(name)?;
        tag.borrow_mut().color = color.to_string();
        Ok(())
    }

    /// Unregisters a tag, making its name available again.
    ///
    /// Returns the removed instance so the caller can detach holders.
    pub fn delete(&mut self, name: &str) -> Result<TagRef, TagError> {
        self.tags
            .remove(name)
            .ok_or_else(|| TagError::TagNotFound(name.to_string()))
    }

    pub fn snapshot(&self) -> Vec<TagCache> {
        self.tags.values().map(|tag| tag.borrow().snapshot()).collect()
    }
}
