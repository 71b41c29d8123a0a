//! Folder domain model.
//!
//! # Invariants
//! - A folder owns its notes and subfolders exclusively.
//! - Subfolders are held behind `Arc` so rebuilt tree versions share every
//!   subtree they did not touch.

use crate::model::id::EntityId;
use crate::model::note::Note;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name given to freshly created folders.
pub const DEFAULT_FOLDER_NAME: &str = "New Folder";

/// Named container of notes and nested folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: EntityId,
    pub name: String,
    /// Most recently inserted first.
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Most recently inserted first.
    #[serde(default)]
    pub subfolders: Vec<Arc<Folder>>,
}

impl Folder {
    /// Creates an empty folder with the default name.
    pub fn new(id: EntityId) -> Self {
        Self::named(id, DEFAULT_FOLDER_NAME)
    }

    pub fn named(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            notes: Vec::new(),
            subfolders: Vec::new(),
        }
    }

    /// Counts notes in this folder and all descendants.
    pub fn note_count(&self) -> usize {
        self.notes.len()
            + self
                .subfolders
                .iter()
                .map(|folder| folder.note_count())
                .sum::<usize>()
    }

    /// Returns true when `id` names this folder or any descendant folder.
    pub fn contains_folder(&self, id: EntityId) -> bool {
        self.id == id
            || self
                .subfolders
                .iter()
                .any(|folder| folder.contains_folder(id))
    }

    /// Visits every note in pre-order (own notes, then subfolders).
    pub fn for_each_note<'a>(&'a self, visit: &mut impl FnMut(&'a Note)) {
        for note in &self.notes {
            visit(note);
        }
        for folder in &self.subfolders {
            folder.for_each_note(visit);
        }
    }

    /// Visits this folder and every descendant folder in pre-order.
    pub fn for_each_folder<'a>(&'a self, visit: &mut impl FnMut(&'a Folder)) {
        visit(self);
        for folder in &self.subfolders {
            folder.for_each_folder(visit);
        }
    }
}
