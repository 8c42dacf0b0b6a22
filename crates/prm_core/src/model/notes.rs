//! Timestamped notes owned by a contact.
//!
//! # Invariants
//! - `Notes` is always ordered by `created_at`, oldest first.
//! - Editing a note replaces its text only; creation time and position are
//!   unchanged.

use crate::cache::NoteCache;
use chrono::{Local, NaiveDateTime};

/// One timestamped text note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    created_at: NaiveDateTime,
    text: String,
}

impl Note {
    /// Creates a note stamped with the current local time.
    pub fn new(text: impl Into<String>) -> Self {
        Self::created_at(Local::now().naive_local(), text)
    }

    pub fn created_at(created_at: NaiveDateTime, text: impl Into<String>) -> Self {
        Self {
            created_at,
            text: text.into(),
        }
    }

    pub fn creation_time(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn snapshot(&self) -> NoteCache {
        NoteCache {
            created_at: self.created_at,
            text: self.text.clone(),
        }
    }
}

impl From<NoteCache> for Note {
    fn from(value: NoteCache) -> Self {
        Self::created_at(value.created_at, value.text)
    }
}

/// Creation-ordered collection of notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notes {
    elements: Vec<Note>,
}

impl Notes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a note stamped with the current local time.
    pub fn add_note(&mut self, text: impl Into<String>) {
        self.insert(Note::new(text));
    }

    /// Inserts a note at its chronological position.
    ///
    /// Notes sharing a timestamp keep insertion order.
    pub fn insert(&mut self, note: Note) {
        let position = self
            .elements
            .partition_point(|existing| existing.created_at <= note.created_at);
        self.elements.insert(position, note);
    }

    pub fn remove_note(&mut self, index: usize) -> Option<Note> {
        if index < self.elements.len() {
            Some(self.elements.remove(index))
        } else {
            None
        }
    }

    pub fn note_at(&self, index: usize) -> Option<&Note> {
        self.elements.get(index)
    }

    /// Replaces the text of the note at `index`. Returns `false` when out of range.
    pub fn edit_note_at(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.elements.get_mut(index) {
            Some(note) => {
                note.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.elements.iter()
    }

    pub fn snapshot(&self) -> Vec<NoteCache> {
        self.elements.iter().map(Note::snapshot).collect()
    }
}

impl FromIterator<Note> for Notes {
    fn from_iter<I: IntoIterator<Item = Note>>(iter: I) -> Self {
        let mut notes = Notes::new();
        for note in iter {
            notes.insert(note);
        }
        notes
    }
}
