//! Core domain logic for the hierarchical memo store.
//! This crate is the single source of truth for tree, trash and selection
//! invariants; front-ends only render what it returns.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::folder::{Folder, DEFAULT_FOLDER_NAME};
pub use model::id::{Clock, EntityId, IdAllocator, SystemClock};
pub use model::note::{Note, NotePatch, UNTITLED_NOTE_LABEL};
pub use model::trash::Trash;
pub use model::tree::{EntityTree, NoteLocation, TreeError, TreeResult};
pub use repo::kv_repo::{KvError, KvResult, KvStore, SqliteKvStore};
pub use repo::memo_repo::{
    MemoRepository, Partitions, PersistError, PersistResult, FOLDERS_KEY, NOTES_KEY, TRASH_KEY,
};
pub use service::expansion::ExpansionState;
pub use service::memo_store::{MemoStore, StoreEvent, StoreListener, SubscriptionId};
pub use service::selection::{resolve_current, CurrentNote, Selection, ViewMode};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
