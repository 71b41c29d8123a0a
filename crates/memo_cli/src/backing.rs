//! Store file selection.
//!
//! # Invariants
//! - An unusable store file never ends the session: the caller always gets
//!   a connection, falling back to a private in-memory store.
//! - A file connection is only returned once it passed the key-value
//!   readiness checks.

use log::warn;
use memo_core::db::{open_db, open_db_in_memory};
use memo_core::{DbResult, KvResult, SqliteKvStore};
use rusqlite::Connection;
use std::path::Path;

/// Where the session's writes end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    File,
    /// The file was unusable; nothing outlives the process.
    Memory,
}

/// Opens `path`, or an empty in-memory store when the file is unusable.
///
/// # Side effects
/// - Emits a `store_open` warning with `fallback=memory` when the file
///   cannot be opened, migrated or validated.
///
/// # Errors
/// - Only when even the in-memory store cannot be created.
pub fn open_backing(path: &Path) -> DbResult<(Connection, Backing)> {
    match open_file(path) {
        Ok(conn) => Ok((conn, Backing::File)),
        Err(err) => {
            warn!(
                "event=store_open module=cli status=error fallback=memory path={} error={err}",
                path.display()
            );
            Ok((open_db_in_memory()?, Backing::Memory))
        }
    }
}

fn open_file(path: &Path) -> KvResult<Connection> {
    let conn = open_db(path)?;
    SqliteKvStore::try_new(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::{open_backing, Backing};
    use memo_core::{MemoStore, SqliteKvStore};
    use rusqlite::Connection;

    #[test]
    fn usable_file_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let (_conn, backing) = open_backing(&dir.path().join("memo.db")).unwrap();
        assert_eq!(backing, Backing::File);
    }

    #[test]
    fn unreachable_path_falls_back_to_empty_memory_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("nested").join("memo.db");

        let (conn, backing) = open_backing(&path).unwrap();
        assert_eq!(backing, Backing::Memory);

        let mut store = MemoStore::open(SqliteKvStore::try_new(&conn).unwrap());
        assert!(store.list_top_level().is_empty());
        assert!(store.create_note(None).is_some());
    }

    #[test]
    fn newer_schema_falls_back_without_touching_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 999;").unwrap();
        drop(conn);

        let (_conn, backing) = open_backing(&path).unwrap();
        assert_eq!(backing, Backing::Memory);

        let reopened = Connection::open(&path).unwrap();
        let version: u32 = reopened
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 999);
    }
}
