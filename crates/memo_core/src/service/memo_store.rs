//! Hierarchical memo store: the collaborator-facing command/query surface.
//!
//! # Responsibility
//! - Own the active tree, the trash, the session selection and the folder
//!   expansion set.
//! - Run each command to completion, persist all partitions, then notify
//!   subscribers.
//!
//! # Invariants
//! - Missing ids and blank folder names are no-ops, never errors.
//! - A failed save is logged, reported to subscribers as
//!   `StoreEvent::SaveFailed`, and does not roll back in-memory state.
//! - A note id is held by exactly one of: top-level list, one folder, trash.
//! - Deleting a folder discards its contents without trashing them.
//! - Restored notes always land at the top level.

use crate::model::folder::Folder;
use crate::model::id::{Clock, EntityId, IdAllocator, SystemClock};
use crate::model::note::{Note, NotePatch};
use crate::model::trash::Trash;
use crate::model::tree::{EntityTree, NoteLocation, TreeError};
use crate::repo::kv_repo::KvStore;
use crate::repo::memo_repo::{MemoRepository, Partitions};
use crate::service::expansion::ExpansionState;
use crate::service::selection::{resolve_current, CurrentNote, Selection, ViewMode};
use log::{debug, info, warn};
use std::sync::Arc;

/// Change notification delivered to subscribers after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// Top-level note list changed.
    NotesChanged,
    TrashChanged,
    /// Folder tree (including notes inside folders) changed.
    FoldersChanged,
    SelectionChanged,
    ExpansionChanged,
    /// The command applied in memory but could not be written to the store.
    SaveFailed,
}

/// Callback invoked once per event, in emission order.
pub type StoreListener = Box<dyn FnMut(StoreEvent)>;

/// Handle returned by [`MemoStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Session over the persisted partitions.
///
/// Commands return whether state changed (`bool`) or the new id (`Option`)
/// instead of errors; see the module invariants.
pub struct MemoStore<K: KvStore, C: Clock = SystemClock> {
    repo: MemoRepository<K>,
    ids: IdAllocator<C>,
    tree: EntityTree,
    trash: Trash,
    selection: Selection,
    expansion: ExpansionState,
    pending_rename: Option<EntityId>,
    listeners: Vec<(SubscriptionId, StoreListener)>,
    next_subscription: u64,
}

impl<K: KvStore> MemoStore<K> {
    /// Loads persisted partitions from `store` and starts a session.
    ///
    /// # Side effects
    /// - Reads all three partition keys once; an unreadable store starts
    ///   empty.
    /// - Emits a `store_ready` logging event with partition sizes.
    pub fn open(store: K) -> Self {
        Self::open_with_clock(store, SystemClock)
    }
}

impl<K: KvStore, C: Clock> MemoStore<K, C> {
    /// Same as [`MemoStore::open`] with an explicit id clock.
    ///
    /// The allocator is seeded past the largest loaded id.
    pub fn open_with_clock(store: K, clock: C) -> Self {
        let repo = MemoRepository::new(store);
        let Partitions {
            notes,
            trash,
            folders,
        } = repo.load();
        let tree = EntityTree::new(notes, folders);
        let trash = Trash::new(trash);

        let mut ids = IdAllocator::with_clock(clock);
        if let Some(highest) = tree.max_id().max(trash.max_id()) {
            ids.observe(highest);
        }

        info!(
            "event=store_ready module=store status=ok notes={} folders={} trash={}",
            tree.notes().len(),
            tree.folders().len(),
            trash.len()
        );

        Self {
            repo,
            ids,
            tree,
            trash,
            selection: Selection::default(),
            expansion: ExpansionState::default(),
            pending_rename: None,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    // Queries.

    /// Note the collaborator is viewing, if any.
    pub fn current_note(&self) -> Option<CurrentNote<'_>> {
        resolve_current(&self.selection, &self.tree, &self.trash)
    }

    /// Top-level notes, most recent first.
    pub fn list_top_level(&self) -> &[Note] {
        self.tree.notes()
    }

    /// Top-level folders with their full subtrees.
    pub fn list_folders(&self) -> &[Arc<Folder>] {
        self.tree.folders()
    }

    /// Trashed notes, most recently deleted first.
    pub fn list_trash(&self) -> &[Note] {
        self.trash.notes()
    }

    /// Session-only display state; false for unknown ids.
    pub fn is_expanded(&self, folder_id: EntityId) -> bool {
        self.expansion.is_expanded(folder_id)
    }

    /// Current mode and the selected id of each view.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// View the collaborator is in.
    pub fn mode(&self) -> ViewMode {
        self.selection.mode
    }

    /// Folder awaiting its first inline rename.
    pub fn pending_rename(&self) -> Option<EntityId> {
        self.pending_rename
    }

    /// Active (non-trashed) note `id` at any depth.
    pub fn find_note(&self, id: EntityId) -> Option<&Note> {
        self.tree.find_note(id)
    }

    /// Folder `id` at any depth.
    pub fn find_folder(&self, id: EntityId) -> Option<&Arc<Folder>> {
        self.tree.find_folder(id)
    }

    /// Read-only view of the active hierarchy.
    pub fn tree(&self) -> &EntityTree {
        &self.tree
    }

    /// Read-only view of the trash partition.
    pub fn trash(&self) -> &Trash {
        &self.trash
    }

    /// Copy of the persisted partitions as currently held in memory.
    pub fn partitions(&self) -> Partitions {
        Partitions {
            notes: self.tree.notes().to_vec(),
            trash: self.trash.notes().to_vec(),
            folders: self.tree.folders().to_vec(),
        }
    }

    // Selection commands.

    /// Selects `id` in the active view. The id is not validated; a stale
    /// id simply resolves to no current note.
    pub fn select_note(&mut self, id: EntityId) {
        self.selection.active_id = Some(id);
        self.emit(&[StoreEvent::SelectionChanged]);
    }

    /// Selects `id` in the trash view.
    pub fn select_trashed_note(&mut self, id: EntityId) {
        self.selection.trash_id = Some(id);
        self.emit(&[StoreEvent::SelectionChanged]);
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.selection.mode != mode {
            self.selection.toggle_mode();
            self.emit(&[StoreEvent::SelectionChanged]);
        }
    }

    /// Switches between active and trash views, dropping the trash selection.
    pub fn toggle_trash(&mut self) {
        self.selection.toggle_mode();
        self.emit(&[StoreEvent::SelectionChanged]);
    }

    // Note commands.

    /// Creates an empty note in `folder_id` (or top level) and selects it.
    pub fn create_note(&mut self, folder_id: Option<EntityId>) -> Option<EntityId> {
        let id = match self.tree.create_note(&mut self.ids, folder_id) {
            Ok(id) => id,
            Err(err) => {
                self.skip("note_create", &err);
                return None;
            }
        };
        self.selection.active_id = Some(id);
        self.selection.mode = ViewMode::Active;
        debug!(
            "event=note_create module=store status=ok note_id={id} folder_id={folder_id:?}"
        );

        self.persist();
        let target = folder_id.map_or(NoteLocation::TopLevel, NoteLocation::Folder);
        self.emit(&[location_event(target), StoreEvent::SelectionChanged]);
        Some(id)
    }

    /// Merges `patch` into the selected active note.
    ///
    /// Ignored in trash mode or without a selection.
    ///
    /// # Side effects
    /// - Persists all partitions and emits the change event for the
    ///   note's container.
    pub fn update_note(&mut self, patch: NotePatch) -> bool {
        if self.selection.mode == ViewMode::Trash || patch.is_empty() {
            return false;
        }
        let Some(id) = self.selection.active_id else {
            return false;
        };
        let Some(location) = self.tree.locate_note(id) else {
            self.skip("note_update", &TreeError::NoteNotFound(id));
            return false;
        };
        if let Err(err) = self.tree.update_note(id, &patch) {
            self.skip("note_update", &err);
            return false;
        }

        self.persist();
        self.emit(&[location_event(location)]);
        true
    }

    /// Appends converted clipboard text to the selected note's content.
    pub fn append_to_current(&mut self, text: &str) -> bool {
        let content = match self.current_note() {
            Some(CurrentNote::Active(note)) => format!("{}{text}", note.content),
            _ => return false,
        };
        self.update_note(NotePatch::content(content))
    }

    /// Moves note `id` from wherever it lives into the trash.
    ///
    /// # Side effects
    /// - Deleting the selected top-level note selects the first remaining
    ///   top-level note; deleting a nested note clears the active selection.
    pub fn delete_note(&mut self, id: EntityId) -> bool {
        let (note, location) = match self.tree.remove_note(id) {
            Ok(removed) => removed,
            Err(err) => {
                self.skip("note_delete", &err);
                return false;
            }
        };
        self.trash.add(note);

        match location {
            NoteLocation::TopLevel => {
                if self.selection.active_id == Some(id) {
                    self.selection.active_id = self.tree.notes().first().map(|note| note.id);
                }
            }
            NoteLocation::Folder(_) => self.selection.active_id = None,
        }
        debug!(
            "event=note_delete module=store status=ok note_id={id} trash={}",
            self.trash.len()
        );

        self.persist();
        self.emit(&[
            location_event(location),
            StoreEvent::TrashChanged,
            StoreEvent::SelectionChanged,
        ]);
        true
    }

    /// Moves note `id` from the trash to the front of the top-level list and
    /// selects it in the active view.
    pub fn restore_note(&mut self, id: EntityId) -> bool {
        let Some(note) = self.trash.take(id) else {
            debug!(
                "event=note_restore module=store status=skipped note_id={id} reason=not_in_trash"
            );
            return false;
        };
        self.tree.prepend_note(note);
        self.selection = Selection {
            mode: ViewMode::Active,
            active_id: Some(id),
            trash_id: None,
        };
        debug!("event=note_restore module=store status=ok note_id={id}");

        self.persist();
        self.emit(&[
            StoreEvent::NotesChanged,
            StoreEvent::TrashChanged,
            StoreEvent::SelectionChanged,
        ]);
        true
    }

    /// Moves note `id` into `folder_id` (or the top level).
    pub fn move_note(&mut self, id: EntityId, folder_id: Option<EntityId>) -> bool {
        let Some(from) = self.tree.locate_note(id) else {
            self.skip("note_move", &TreeError::NoteNotFound(id));
            return false;
        };
        if let Err(err) = self.tree.move_note(id, folder_id) {
            self.skip("note_move", &err);
            return false;
        }
        let to = folder_id.map_or(NoteLocation::TopLevel, NoteLocation::Folder);

        self.persist();
        let mut events = vec![location_event(from)];
        if location_event(to) != events[0] {
            events.push(location_event(to));
        }
        self.emit(&events);
        true
    }

    // Folder commands.

    /// Creates a default-named folder, expands it and marks it for rename.
    pub fn create_folder(&mut self, parent_id: Option<EntityId>) -> Option<EntityId> {
        let id = match self.tree.create_folder(&mut self.ids, parent_id) {
            Ok(id) => id,
            Err(err) => {
                self.skip("folder_create", &err);
                return None;
            }
        };
        self.expansion.expand(id);
        self.pending_rename = Some(id);
        debug!(
            "event=folder_create module=store status=ok folder_id={id} parent_id={parent_id:?}"
        );

        self.persist();
        self.emit(&[StoreEvent::FoldersChanged, StoreEvent::ExpansionChanged]);
        Some(id)
    }

    /// Renames folder `id`; blank names keep the current name.
    ///
    /// Any rename attempt on the pending folder ends its pending state.
    pub fn rename_folder(&mut self, id: EntityId, name: &str) -> bool {
        if self.pending_rename == Some(id) {
            self.pending_rename = None;
        }
        if let Err(err) = self.tree.rename_folder(id, name) {
            self.skip("folder_rename", &err);
            return false;
        }

        self.persist();
        self.emit(&[StoreEvent::FoldersChanged]);
        true
    }

    /// Permanently deletes folder `id` (a direct child of `parent_id`, or a
    /// top-level folder) with all notes and subfolders it owns.
    pub fn delete_folder(&mut self, id: EntityId, parent_id: Option<EntityId>) -> bool {
        let removed = match self.tree.delete_folder(id, parent_id) {
            Ok(removed) => removed,
            Err(err) => {
                self.skip("folder_delete", &err);
                return false;
            }
        };
        if self
            .pending_rename
            .is_some_and(|pending| removed.contains_folder(pending))
        {
            self.pending_rename = None;
        }
        info!(
            "event=folder_delete module=store status=ok folder_id={id} discarded_notes={}",
            removed.note_count()
        );

        self.persist();
        self.emit(&[StoreEvent::FoldersChanged]);
        true
    }

    /// Moves folder `id` under `parent_id` (or to the top level).
    pub fn move_folder(&mut self, id: EntityId, parent_id: Option<EntityId>) -> bool {
        if let Err(err) = self.tree.move_folder(id, parent_id) {
            self.skip("folder_move", &err);
            return false;
        }

        self.persist();
        self.emit(&[StoreEvent::FoldersChanged]);
        true
    }

    /// Flips the expanded state of `folder_id`. Not persisted.
    pub fn toggle_folder_expanded(&mut self, folder_id: EntityId) -> bool {
        let expanded = self.expansion.toggle(folder_id);
        self.emit(&[StoreEvent::ExpansionChanged]);
        expanded
    }

    // Subscriptions.

    pub fn subscribe(&mut self, listener: StoreListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(current, _)| *current != id);
        self.listeners.len() != before
    }

    fn persist(&mut self) {
        if let Err(err) = self
            .repo
            .save(self.tree.notes(), self.trash.notes(), self.tree.folders())
        {
            warn!("event=memo_save module=store status=error error={err}");
            self.emit(&[StoreEvent::SaveFailed]);
        }
    }

    fn emit(&mut self, events: &[StoreEvent]) {
        for (_, listener) in &mut self.listeners {
            for event in events {
                listener(*event);
            }
        }
    }

    fn skip(&self, event: &'static str, err: &TreeError) {
        debug!("event={event} module=store status=skipped reason=\"{err}\"");
    }
}

fn location_event(location: NoteLocation) -> StoreEvent {
    match location {
        NoteLocation::TopLevel => StoreEvent::NotesChanged,
        NoteLocation::Folder(_) => StoreEvent::FoldersChanged,
    }
}
