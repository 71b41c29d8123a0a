//! Note domain model.
//!
//! # Invariants
//! - `id` is stable for the note lifetime and survives trash/restore.
//! - `folder_id` records where the note was created or last moved; the
//!   container actually holding the note is authoritative for location.

use crate::model::id::EntityId;
use serde::{Deserialize, Serialize};

/// Label shown for notes whose title is empty.
pub const UNTITLED_NOTE_LABEL: &str = "Untitled";

/// A single title + content memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: EntityId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Serialized as `folderId`, `null` for top-level notes.
    #[serde(default)]
    pub folder_id: Option<EntityId>,
}

impl Note {
    /// Creates an empty note.
    pub fn new(id: EntityId, folder_id: Option<EntityId>) -> Self {
        Self {
            id,
            title: String::new(),
            content: String::new(),
            folder_id,
        }
    }

    /// Title for list display; falls back to [`UNTITLED_NOTE_LABEL`].
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_NOTE_LABEL
        } else {
            self.title.as_str()
        }
    }
}

/// Partial note edit. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NotePatch {
    pub fn title(value: impl Into<String>) -> Self {
        Self {
            title: Some(value.into()),
            content: None,
        }
    }

    pub fn content(value: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(value.into()),
        }
    }

    /// Returns true when the patch carries no field.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Merges the patch into `note`.
    pub fn apply(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title.clone_from(title);
        }
        if let Some(content) = &self.content {
            note.content.clone_from(content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NotePatch, UNTITLED_NOTE_LABEL};

    #[test]
    fn serializes_with_camel_case_folder_id() {
        let note = Note::new(7, Some(3));
        let json = serde_json::to_string(&note).unwrap();
        assert_eq!(
            json,
            r#"{"id":7,"title":"","content":"","folderId":3}"#
        );
    }

    #[test]
    fn deserializes_legacy_note_without_folder_id() {
        let note: Note = serde_json::from_str(r#"{"id":1,"title":"a","content":"b"}"#).unwrap();
        assert_eq!(note.folder_id, None);
        assert_eq!(note.title, "a");
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut note = Note::new(1, None);
        note.title = "keep".to_string();
        NotePatch::content("body").apply(&mut note);
        assert_eq!(note.title, "keep");
        assert_eq!(note.content, "body");
    }

    #[test]
    fn blank_title_displays_placeholder() {
        let mut note = Note::new(1, None);
        assert_eq!(note.display_title(), UNTITLED_NOTE_LABEL);
        note.title = "Groceries".to_string();
        assert_eq!(note.display_title(), "Groceries");
    }
}
