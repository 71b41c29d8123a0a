//! Persistence adapter for the three store partitions.
//!
//! # Responsibility
//! - Load top-level notes, trash and folder tree from fixed keys once.
//! - Overwrite all three keys in full on every save.
//!
//! # Invariants
//! - `load` never fails: an unreadable store yields three empty partitions,
//!   a malformed document empties only its own partition.
//! - `save` encodes every partition before writing any, then writes all
//!   three in one atomic `put_all`.
//! - Only these three documents are persisted; selection, mode and folder
//!   expansion are session state.

use crate::model::folder::Folder;
use crate::model::note::Note;
use crate::repo::kv_repo::{KvError, KvStore};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Key holding top-level notes (`Note[]`).
pub const NOTES_KEY: &str = "markdown_memos_v_final_hover";
/// Key holding trashed notes (`Note[]`, most recently deleted first).
pub const TRASH_KEY: &str = "markdown_memos_trash_v1";
/// Key holding the folder tree (`Folder[]`).
pub const FOLDERS_KEY: &str = "markdown_memos_folders_v1";

pub type PersistResult<T> = Result<T, PersistError>;

/// Errors raised while saving partitions.
#[derive(Debug)]
pub enum PersistError {
    /// Backing store rejected the write.
    Store(KvError),
    /// A partition could not be encoded as JSON.
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Encode { source, .. } => Some(source),
        }
    }
}

impl From<KvError> for PersistError {
    fn from(value: KvError) -> Self {
        Self::Store(value)
    }
}

/// Loaded contents of the three persisted documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitions {
    pub notes: Vec<Note>,
    pub trash: Vec<Note>,
    pub folders: Vec<Arc<Folder>>,
}

/// Reads and writes [`Partitions`] through a [`KvStore`].
pub struct MemoRepository<K: KvStore> {
    store: K,
}

impl<K: KvStore> MemoRepository<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Loads all partitions, degrading to empty ones on failure.
    pub fn load(&self) -> Partitions {
        match self.try_load() {
            Ok(partitions) => {
                debug!(
                    "event=memo_load module=repo status=ok notes={} trash={} folders={}",
                    partitions.notes.len(),
                    partitions.trash.len(),
                    partitions.folders.len()
                );
                partitions
            }
            Err(err) => {
                warn!("event=memo_load module=repo status=error fallback=empty error={err}");
                Partitions::default()
            }
        }
    }

    /// Encodes and writes all partitions.
    pub fn save(
        &self,
        notes: &[Note],
        trash: &[Note],
        folders: &[Arc<Folder>],
    ) -> PersistResult<()> {
        let entries = [
            (NOTES_KEY, encode(NOTES_KEY, notes)?),
            (TRASH_KEY, encode(TRASH_KEY, trash)?),
            (FOLDERS_KEY, encode(FOLDERS_KEY, folders)?),
        ];
        self.store.put_all(&entries)?;
        Ok(())
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    fn try_load(&self) -> Result<Partitions, KvError> {
        Ok(Partitions {
            notes: self.load_partition(NOTES_KEY)?,
            trash: self.load_partition(TRASH_KEY)?,
            folders: self.load_partition(FOLDERS_KEY)?,
        })
    }

    fn load_partition<T: DeserializeOwned>(&self, key: &'static str) -> Result<Vec<T>, KvError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(err) => {
                warn!(
                    "event=memo_load module=repo status=error key={key} fallback=empty error_code=invalid_json error={err}"
                );
                Ok(Vec::new())
            }
        }
    }
}

fn encode<T: Serialize + ?Sized>(key: &'static str, value: &T) -> PersistResult<String> {
    serde_json::to_string(value).map_err(|source| PersistError::Encode { key, source })
}
