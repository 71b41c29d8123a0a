//! Entity tree: nested folders and notes.
//!
//! # Responsibility
//! - Locate, insert, update, remove, rename and move notes/folders at any
//!   depth of the folder hierarchy.
//! - Keep every structural edit copy-on-write: the functions in this module
//!   take a folder slice and return a rebuilt root, cloning only the folders
//!   on the path to the edited node and sharing all other subtrees.
//!
//! # Invariants
//! - Search order is top-level notes first, then folders in pre-order (a
//!   folder's own notes before its subfolders).
//! - New entities are prepended to their container.
//! - A failed edit leaves the tree untouched.
//! - A folder is never moved below itself.

use crate::model::folder::Folder;
use crate::model::id::{Clock, EntityId, IdAllocator};
use crate::model::note::{Note, NotePatch};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type TreeResult<T> = Result<T, TreeError>;

/// Errors from entity tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// No note with this id exists in the tree.
    NoteNotFound(EntityId),
    /// No folder with this id exists in the tree (or under the given parent).
    FolderNotFound(EntityId),
    /// Folder name is blank after trim.
    InvalidFolderName,
    /// Move would place a folder inside itself or one of its descendants.
    CycleDetected {
        folder_id: EntityId,
        parent_id: EntityId,
    },
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::FolderNotFound(id) => write!(f, "folder not found: {id}"),
            Self::InvalidFolderName => write!(f, "folder name must not be blank"),
            Self::CycleDetected {
                folder_id,
                parent_id,
            } => write!(
                f,
                "move would create cycle: folder {folder_id} under parent {parent_id}"
            ),
        }
    }
}

impl Error for TreeError {}

/// Container currently holding a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteLocation {
    TopLevel,
    Folder(EntityId),
}

/// Root of the active (non-trashed) hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTree {
    notes: Vec<Note>,
    folders: Vec<Arc<Folder>>,
}

impl EntityTree {
    /// Builds a tree from loaded top-level notes and folders.
    ///
    /// Callers are responsible for passing partitions that hold each id
    /// once; no deduplication happens here.
    pub fn new(notes: Vec<Note>, folders: Vec<Arc<Folder>>) -> Self {
        Self { notes, folders }
    }

    /// Top-level notes, most recent first.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Top-level folders, most recent first.
    pub fn folders(&self) -> &[Arc<Folder>] {
        &self.folders
    }

    /// Splits the tree back into `(notes, folders)` for persistence.
    pub fn into_parts(self) -> (Vec<Note>, Vec<Arc<Folder>>) {
        (self.notes, self.folders)
    }

    /// Finds note `id` at any depth.
    ///
    /// Top-level notes are checked first, then folders in pre-order (a
    /// folder's own notes before its subfolders).
    pub fn find_note(&self, id: EntityId) -> Option<&Note> {
        self.notes
            .iter()
            .find(|note| note.id == id)
            .or_else(|| find_note_in(&self.folders, id))
    }

    /// Returns the container holding note `id`.
    pub fn locate_note(&self, id: EntityId) -> Option<NoteLocation> {
        if self.notes.iter().any(|note| note.id == id) {
            return Some(NoteLocation::TopLevel);
        }
        find_note_owner(&self.folders, id).map(|folder| NoteLocation::Folder(folder.id))
    }

    /// Finds folder `id` at any depth, pre-order.
    pub fn find_folder(&self, id: EntityId) -> Option<&Arc<Folder>> {
        find_folder_in(&self.folders, id)
    }

    /// Every note id in search order.
    pub fn note_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.notes.iter().map(|note| note.id).collect();
        for folder in &self.folders {
            folder.for_each_note(&mut |note| ids.push(note.id));
        }
        ids
    }

    /// Largest note or folder id in the tree.
    pub fn max_id(&self) -> Option<EntityId> {
        let mut highest = self.notes.iter().map(|note| note.id).max();
        for folder in &self.folders {
            folder.for_each_folder(&mut |current| {
                let local = current
                    .notes
                    .iter()
                    .map(|note| note.id)
                    .chain(std::iter::once(current.id))
                    .max();
                highest = highest.max(local);
            });
        }
        highest
    }

    /// Merges `patch` into note `id` wherever it lives.
    ///
    /// # Errors
    /// - `NoteNotFound` when no container holds `id`; the tree is unchanged.
    pub fn update_note(&mut self, id: EntityId, patch: &NotePatch) -> TreeResult<()> {
        if let Some(note) = self.notes.iter_mut().find(|note| note.id == id) {
            patch.apply(note);
            return Ok(());
        }
        self.folders =
            update_note_in(&self.folders, id, patch).ok_or(TreeError::NoteNotFound(id))?;
        Ok(())
    }

    /// Allocates an empty note and prepends it to `target` or the top level.
    ///
    /// # Errors
    /// - `FolderNotFound` when `target` names no folder; no id is consumed.
    pub fn create_note<C: Clock>(
        &mut self,
        ids: &mut IdAllocator<C>,
        target: Option<EntityId>,
    ) -> TreeResult<EntityId> {
        if let Some(folder_id) = target {
            if self.find_folder(folder_id).is_none() {
                return Err(TreeError::FolderNotFound(folder_id));
            }
        }
        let note = Note::new(ids.next(), target);
        let id = note.id;
        self.insert_note(note, target)?;
        Ok(id)
    }

    /// Prepends an existing note to the top-level list.
    pub fn prepend_note(&mut self, note: Note) {
        self.notes.insert(0, note);
    }

    /// Removes note `id` from whichever container holds it.
    ///
    /// # Errors
    /// - `NoteNotFound` when no container holds `id`.
    pub fn remove_note(&mut self, id: EntityId) -> TreeResult<(Note, NoteLocation)> {
        if let Some(index) = self.notes.iter().position(|note| note.id == id) {
            return Ok((self.notes.remove(index), NoteLocation::TopLevel));
        }
        let (folders, note, owner) =
            remove_note_from(&self.folders, id).ok_or(TreeError::NoteNotFound(id))?;
        self.folders = folders;
        Ok((note, NoteLocation::Folder(owner)))
    }

    /// Moves note `id` to the front of `target` (or the top level).
    ///
    /// # Errors
    /// - `FolderNotFound` / `NoteNotFound`; the tree is unchanged on error.
    pub fn move_note(&mut self, id: EntityId, target: Option<EntityId>) -> TreeResult<()> {
        if let Some(folder_id) = target {
            if self.find_folder(folder_id).is_none() {
                return Err(TreeError::FolderNotFound(folder_id));
            }
        }
        let mut next = self.clone();
        let (mut note, _) = next.remove_note(id)?;
        note.folder_id = target;
        next.insert_note(note, target)?;
        *self = next;
        Ok(())
    }

    /// Allocates an empty default-named folder under `parent` (or top level).
    pub fn create_folder<C: Clock>(
        &mut self,
        ids: &mut IdAllocator<C>,
        parent: Option<EntityId>,
    ) -> TreeResult<EntityId> {
        let Some(parent_id) = parent else {
            let folder = Folder::new(ids.next());
            let id = folder.id;
            self.folders.insert(0, Arc::new(folder));
            return Ok(id);
        };
        if self.find_folder(parent_id).is_none() {
            return Err(TreeError::FolderNotFound(parent_id));
        }
        let folder = Folder::new(ids.next());
        let id = folder.id;
        self.folders = insert_subfolder_into(&self.folders, parent_id, Arc::new(folder))
            .map_err(|_| TreeError::FolderNotFound(parent_id))?;
        Ok(id)
    }

    /// Renames folder `id` to the trimmed `name`.
    ///
    /// # Errors
    /// - `InvalidFolderName` for blank names.
    /// - `FolderNotFound` when `id` names no folder.
    pub fn rename_folder(&mut self, id: EntityId, name: &str) -> TreeResult<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TreeError::InvalidFolderName);
        }
        self.folders =
            rename_folder_in(&self.folders, id, trimmed).ok_or(TreeError::FolderNotFound(id))?;
        Ok(())
    }

    /// Hard-deletes folder `id` with everything it owns.
    ///
    /// Without `parent`, only top-level folders match; with `parent`, only
    /// direct children of that folder match.
    ///
    /// # Errors
    /// - `FolderNotFound` when `parent` or the matching child is missing.
    pub fn delete_folder(
        &mut self,
        id: EntityId,
        parent: Option<EntityId>,
    ) -> TreeResult<Arc<Folder>> {
        match parent {
            None => {
                let index = self
                    .folders
                    .iter()
                    .position(|folder| folder.id == id)
                    .ok_or(TreeError::FolderNotFound(id))?;
                Ok(self.folders.remove(index))
            }
            Some(parent_id) => {
                if self.find_folder(parent_id).is_none() {
                    return Err(TreeError::FolderNotFound(parent_id));
                }
                let (folders, removed) = remove_child_folder(&self.folders, parent_id, id)
                    .ok_or(TreeError::FolderNotFound(id))?;
                self.folders = folders;
                Ok(removed)
            }
        }
    }

    /// Moves folder `id` (with its subtree) under `new_parent` or to the
    /// top level.
    ///
    /// # Errors
    /// - `CycleDetected` when `new_parent` is `id` or one of its descendants.
    /// - `FolderNotFound` when either folder is missing.
    pub fn move_folder(&mut self, id: EntityId, new_parent: Option<EntityId>) -> TreeResult<()> {
        let folder = self.find_folder(id).ok_or(TreeError::FolderNotFound(id))?;
        if let Some(parent_id) = new_parent {
            if folder.contains_folder(parent_id) {
                return Err(TreeError::CycleDetected {
                    folder_id: id,
                    parent_id,
                });
            }
            if self.find_folder(parent_id).is_none() {
                return Err(TreeError::FolderNotFound(parent_id));
            }
        }

        let (mut folders, detached) =
            detach_folder(&self.folders, id).ok_or(TreeError::FolderNotFound(id))?;
        match new_parent {
            None => folders.insert(0, detached),
            Some(parent_id) => {
                folders = insert_subfolder_into(&folders, parent_id, detached)
                    .map_err(|_| TreeError::FolderNotFound(parent_id))?;
            }
        }
        self.folders = folders;
        Ok(())
    }

    fn insert_note(&mut self, note: Note, target: Option<EntityId>) -> TreeResult<()> {
        match target {
            None => {
                self.notes.insert(0, note);
                Ok(())
            }
            Some(folder_id) => {
                self.folders = insert_note_into(&self.folders, folder_id, note)
                    .map_err(|_| TreeError::FolderNotFound(folder_id))?;
                Ok(())
            }
        }
    }
}

/// Finds a note inside `folders` (pre-order, own notes before subfolders).
pub fn find_note_in(folders: &[Arc<Folder>], id: EntityId) -> Option<&Note> {
    find_note_owner(folders, id)
        .and_then(|folder| folder.notes.iter().find(|note| note.id == id))
}

/// Finds the folder whose own note list holds note `id`.
pub fn find_note_owner(folders: &[Arc<Folder>], id: EntityId) -> Option<&Folder> {
    folders.iter().find_map(|folder| {
        if folder.notes.iter().any(|note| note.id == id) {
            Some(folder.as_ref())
        } else {
            find_note_owner(&folder.subfolders, id)
        }
    })
}

pub fn find_folder_in(folders: &[Arc<Folder>], id: EntityId) -> Option<&Arc<Folder>> {
    folders.iter().find_map(|folder| {
        if folder.id == id {
            Some(folder)
        } else {
            find_folder_in(&folder.subfolders, id)
        }
    })
}

/// Returns a rebuilt root with `patch` merged into note `id`.
pub fn update_note_in(
    folders: &[Arc<Folder>],
    id: EntityId,
    patch: &NotePatch,
) -> Option<Vec<Arc<Folder>>> {
    rebuild_first(folders, &mut |folder: &Folder| {
        let index = folder.notes.iter().position(|note| note.id == id)?;
        let mut edited = folder.clone();
        patch.apply(&mut edited.notes[index]);
        Some((edited, ()))
    })
    .map(|(root, ())| root)
}

/// Returns a rebuilt root with `note` prepended to folder `folder_id`.
///
/// Hands the note back when the folder does not exist.
pub fn insert_note_into(
    folders: &[Arc<Folder>],
    folder_id: EntityId,
    note: Note,
) -> Result<Vec<Arc<Folder>>, Note> {
    let rebuilt = rebuild_first(folders, &mut |folder: &Folder| {
        if folder.id != folder_id {
            return None;
        }
        let mut edited = folder.clone();
        edited.notes.insert(0, note.clone());
        Some((edited, ()))
    });
    rebuilt.map(|(root, ())| root).ok_or(note)
}

/// Returns a rebuilt root without note `id`, the removed note, and the id of
/// the folder that held it.
pub fn remove_note_from(
    folders: &[Arc<Folder>],
    id: EntityId,
) -> Option<(Vec<Arc<Folder>>, Note, EntityId)> {
    rebuild_first(folders, &mut |folder: &Folder| {
        let index = folder.notes.iter().position(|note| note.id == id)?;
        let mut edited = folder.clone();
        let removed = edited.notes.remove(index);
        Some((edited, (removed, folder.id)))
    })
    .map(|(root, (note, owner))| (root, note, owner))
}

/// Returns a rebuilt root with `child` prepended to `parent_id`'s subfolders.
pub fn insert_subfolder_into(
    folders: &[Arc<Folder>],
    parent_id: EntityId,
    child: Arc<Folder>,
) -> Result<Vec<Arc<Folder>>, Arc<Folder>> {
    let rebuilt = rebuild_first(folders, &mut |folder: &Folder| {
        if folder.id != parent_id {
            return None;
        }
        let mut edited = folder.clone();
        edited.subfolders.insert(0, Arc::clone(&child));
        Some((edited, ()))
    });
    rebuilt.map(|(root, ())| root).ok_or(child)
}

/// Returns a rebuilt root with folder `id` renamed.
pub fn rename_folder_in(
    folders: &[Arc<Folder>],
    id: EntityId,
    name: &str,
) -> Option<Vec<Arc<Folder>>> {
    rebuild_first(folders, &mut |folder: &Folder| {
        if folder.id != id {
            return None;
        }
        let mut edited = folder.clone();
        edited.name = name.to_string();
        Some((edited, ()))
    })
    .map(|(root, ())| root)
}

/// Returns a rebuilt root without the direct child `child_id` of `parent_id`.
pub fn remove_child_folder(
    folders: &[Arc<Folder>],
    parent_id: EntityId,
    child_id: EntityId,
) -> Option<(Vec<Arc<Folder>>, Arc<Folder>)> {
    rebuild_first(folders, &mut |folder: &Folder| {
        if folder.id != parent_id {
            return None;
        }
        let index = folder
            .subfolders
            .iter()
            .position(|child| child.id == child_id)?;
        let mut edited = folder.clone();
        let removed = edited.subfolders.remove(index);
        Some((edited, removed))
    })
}

/// Returns a rebuilt root without folder `id`, wherever it sits.
pub fn detach_folder(
    folders: &[Arc<Folder>],
    id: EntityId,
) -> Option<(Vec<Arc<Folder>>, Arc<Folder>)> {
    if let Some(index) = folders.iter().position(|folder| folder.id == id) {
        let mut root = folders.to_vec();
        let removed = root.remove(index);
        return Some((root, removed));
    }
    rebuild_first(folders, &mut |folder: &Folder| {
        let index = folder.subfolders.iter().position(|child| child.id == id)?;
        let mut edited = folder.clone();
        let removed = edited.subfolders.remove(index);
        Some((edited, removed))
    })
}

/// Applies `edit` to the first folder (pre-order) it accepts and rebuilds
/// the path from the root down to it. Untouched siblings are shared.
fn rebuild_first<T, F>(folders: &[Arc<Folder>], edit: &mut F) -> Option<(Vec<Arc<Folder>>, T)>
where
    F: FnMut(&Folder) -> Option<(Folder, T)>,
{
    for (index, folder) in folders.iter().enumerate() {
        let replacement = match edit(folder) {
            Some(hit) => Some(hit),
            None => rebuild_first(&folder.subfolders, edit).map(|(subfolders, value)| {
                let rebuilt = Folder {
                    id: folder.id,
                    name: folder.name.clone(),
                    notes: folder.notes.clone(),
                    subfolders,
                };
                (rebuilt, value)
            }),
        };
        if let Some((rebuilt, value)) = replacement {
            let mut root = folders.to_vec();
            root[index] = Arc::new(rebuilt);
            return Some((root, value));
        }
    }
    None
}
