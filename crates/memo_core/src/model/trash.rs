//! Trash partition for soft-deleted notes.
//!
//! # Invariants
//! - Flat list, most recently trashed first.
//! - Entries keep their `id`, `title` and `content` verbatim.
//! - Entries are never purged here; they only leave via `take`.

use crate::model::id::EntityId;
use crate::model::note::Note;

/// Soft-deleted notes, disjoint from the active tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trash {
    notes: Vec<Note>,
}

impl Trash {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    /// Prepends a trashed note.
    pub fn add(&mut self, note: Note) {
        self.notes.insert(0, note);
    }

    pub fn find(&self, id: EntityId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Removes and returns note `id`.
    pub fn take(&mut self, id: EntityId) -> Option<Note> {
        let index = self.notes.iter().position(|note| note.id == id)?;
        Some(self.notes.remove(index))
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn max_id(&self) -> Option<EntityId> {
        self.notes.iter().map(|note| note.id).max()
    }

    pub fn into_notes(self) -> Vec<Note> {
        self.notes
    }
}
