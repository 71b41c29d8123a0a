//! Current-note resolution.
//!
//! # Invariants
//! - Resolution is a pure function of mode, the two selected ids and the
//!   partitions; stale or missing ids resolve to `None`.
//! - Leaving trash mode clears the trash selection.

use crate::model::id::EntityId;
use crate::model::note::Note;
use crate::model::trash::Trash;
use crate::model::tree::EntityTree;

/// Which partition the collaborator is viewing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Active,
    Trash,
}

/// Session selection state. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub mode: ViewMode,
    pub active_id: Option<EntityId>,
    pub trash_id: Option<EntityId>,
}

impl Selection {
    /// Flips between active and trash views; the trash selection is dropped.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            ViewMode::Active => ViewMode::Trash,
            ViewMode::Trash => ViewMode::Active,
        };
        self.trash_id = None;
    }

    /// Selected id for the current mode.
    pub fn selected_id(&self) -> Option<EntityId> {
        match self.mode {
            ViewMode::Active => self.active_id,
            ViewMode::Trash => self.trash_id,
        }
    }
}

/// The note the collaborator is viewing, tagged by partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentNote<'a> {
    Active(&'a Note),
    Trashed(&'a Note),
}

impl<'a> CurrentNote<'a> {
    pub fn note(&self) -> &'a Note {
        match *self {
            Self::Active(note) | Self::Trashed(note) => note,
        }
    }

    /// Trashed notes are read-only.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

/// Resolves the current note for `selection`.
pub fn resolve_current<'a>(
    selection: &Selection,
    tree: &'a EntityTree,
    trash: &'a Trash,
) -> Option<CurrentNote<'a>> {
    match selection.mode {
        ViewMode::Trash => trash.find(selection.trash_id?).map(CurrentNote::Trashed),
        ViewMode::Active => tree.find_note(selection.active_id?).map(CurrentNote::Active),
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_current, CurrentNote, Selection, ViewMode};
    use crate::model::folder::Folder;
    use crate::model::note::Note;
    use crate::model::trash::Trash;
    use crate::model::tree::EntityTree;
    use std::sync::Arc;

    fn fixture() -> (EntityTree, Trash) {
        let mut folder = Folder::named(1, "f");
        folder.notes.push(Note::new(11, Some(1)));
        let tree = EntityTree::new(vec![Note::new(10, None)], vec![Arc::new(folder)]);
        let trash = Trash::new(vec![Note::new(20, None)]);
        (tree, trash)
    }

    #[test]
    fn active_mode_finds_nested_notes() {
        let (tree, trash) = fixture();
        let selection = Selection {
            active_id: Some(11),
            ..Selection::default()
        };
        let current = resolve_current(&selection, &tree, &trash).unwrap();
        assert_eq!(current.note().id, 11);
        assert!(current.is_editable());
    }

    #[test]
    fn trash_mode_ignores_active_selection() {
        let (tree, trash) = fixture();
        let mut selection = Selection {
            mode: ViewMode::Trash,
            active_id: Some(10),
            trash_id: None,
        };
        assert!(resolve_current(&selection, &tree, &trash).is_none());
        selection.trash_id = Some(20);
        let current = resolve_current(&selection, &tree, &trash).unwrap();
        assert!(matches!(current, CurrentNote::Trashed(note) if note.id == 20));
        assert!(!current.is_editable());
    }

    #[test]
    fn stale_ids_resolve_to_none() {
        let (tree, trash) = fixture();
        let selection = Selection {
            active_id: Some(999),
            ..Selection::default()
        };
        assert!(resolve_current(&selection, &tree, &trash).is_none());
    }

    #[test]
    fn toggle_mode_clears_trash_selection() {
        let mut selection = Selection {
            mode: ViewMode::Trash,
            active_id: Some(1),
            trash_id: Some(2),
        };
        selection.toggle_mode();
        assert_eq!(selection.mode, ViewMode::Active);
        assert_eq!(selection.trash_id, None);
        assert_eq!(selection.active_id, Some(1));
    }
}
