use memo_core::db::{open_db, open_db_in_memory};
use memo_core::{
    KvError, KvResult, KvStore, MemoRepository, MemoStore, NotePatch, PersistError,
    SqliteKvStore, StoreEvent, FOLDERS_KEY, NOTES_KEY, TRASH_KEY,
};
use rusqlite::Connection;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Store whose reads and/or writes always fail.
struct BrokenStore {
    reads_fail: bool,
    writes: Cell<usize>,
}

impl BrokenStore {
    fn unreadable() -> Self {
        Self {
            reads_fail: true,
            writes: Cell::new(0),
        }
    }

    fn read_only() -> Self {
        Self {
            reads_fail: false,
            writes: Cell::new(0),
        }
    }
}

impl KvStore for BrokenStore {
    fn get(&self, _key: &str) -> KvResult<Option<String>> {
        if self.reads_fail {
            return Err(KvError::Unavailable("disk detached".to_string()));
        }
        Ok(None)
    }

    fn put_all(&self, _entries: &[(&str, String)]) -> KvResult<()> {
        self.writes.set(self.writes.get() + 1);
        Err(KvError::Unavailable("quota exceeded".to_string()))
    }
}

#[test]
fn reopened_store_sees_saved_partitions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memo.db");

    let (folder, nested, top, trashed) = {
        let conn = open_db(&path).unwrap();
        let mut store = MemoStore::open(SqliteKvStore::try_new(&conn).unwrap());
        let folder = store.create_folder(None).unwrap();
        store.rename_folder(folder, "Work");
        let nested = store.create_note(Some(folder)).unwrap();
        store.update_note(NotePatch::title("Nested"));
        let trashed = store.create_note(None).unwrap();
        store.update_note(NotePatch::content("old"));
        store.delete_note(trashed);
        let top = store.create_note(None).unwrap();
        store.update_note(NotePatch::content("# Heading"));
        (folder, nested, top, trashed)
    };

    let conn = open_db(&path).unwrap();
    let store = MemoStore::open(SqliteKvStore::try_new(&conn).unwrap());
    assert_eq!(store.find_folder(folder).unwrap().name, "Work");
    assert_eq!(store.find_note(nested).unwrap().title, "Nested");
    assert_eq!(store.find_note(top).unwrap().content, "# Heading");
    assert_eq!(store.list_trash()[0].id, trashed);
    assert_eq!(store.list_trash()[0].content, "old");

    // Session state starts fresh.
    assert!(store.current_note().is_none());
    assert!(!store.is_expanded(folder));
    assert_eq!(store.pending_rename(), None);
}

#[test]
fn save_then_load_reproduces_partitions() {
    let conn = open_db_in_memory().unwrap();
    let mut store = MemoStore::open(SqliteKvStore::try_new(&conn).unwrap());
    let outer = store.create_folder(None).unwrap();
    let inner = store.create_folder(Some(outer)).unwrap();
    store.create_note(Some(inner));
    store.create_note(None);
    let gone = store.create_note(None).unwrap();
    store.delete_note(gone);
    let expected = store.partitions();

    let reloaded = MemoRepository::new(SqliteKvStore::try_new(&conn).unwrap()).load();
    assert_eq!(reloaded, expected);
}

#[test]
fn ids_created_after_reload_exceed_persisted_ids() {
    let conn = open_db_in_memory().unwrap();
    let existing = {
        let mut store = MemoStore::open(SqliteKvStore::try_new(&conn).unwrap());
        let far_future = 9_000_000_000_000;
        let note = store.create_note(None).unwrap();
        store.update_note(NotePatch::title("seed"));
        // Rewrite the persisted id to something ahead of the wall clock.
        let mut partitions = store.partitions();
        partitions.notes[0].id = far_future;
        MemoRepository::new(SqliteKvStore::try_new(&conn).unwrap())
            .save(&partitions.notes, &partitions.trash, &partitions.folders)
            .unwrap();
        assert_ne!(note, far_future);
        far_future
    };

    let mut store = MemoStore::open(SqliteKvStore::try_new(&conn).unwrap());
    let fresh = store.create_note(None).unwrap();
    assert!(fresh > existing);
}

#[test]
fn expansion_and_selection_are_never_written() {
    let conn = open_db_in_memory().unwrap();
    let mut store = MemoStore::open(SqliteKvStore::try_new(&conn).unwrap());
    let folder = store.create_folder(None).unwrap();
    store.toggle_folder_expanded(folder);
    store.toggle_folder_expanded(folder);
    store.create_note(Some(folder));

    assert_eq!(
        stored_keys(&conn),
        vec![FOLDERS_KEY.to_string(), TRASH_KEY.to_string(), NOTES_KEY.to_string()]
    );
    let documents: String = [NOTES_KEY, TRASH_KEY, FOLDERS_KEY]
        .iter()
        .filter_map(|key| SqliteKvStore::try_new(&conn).unwrap().get(key).unwrap())
        .collect();
    assert!(!documents.contains("expanded"));
    assert!(!documents.contains("selected"));
}

#[test]
fn unreadable_store_starts_empty() {
    let store = MemoStore::open(BrokenStore::unreadable());
    assert!(store.list_top_level().is_empty());
    assert!(store.list_folders().is_empty());
    assert!(store.list_trash().is_empty());
}

#[test]
fn failed_saves_keep_in_memory_state() {
    let broken = BrokenStore::read_only();
    let mut store = MemoStore::open(&broken);

    let note = store.create_note(None).unwrap();
    assert!(store.update_note(NotePatch::content("still here")));
    assert_eq!(store.find_note(note).unwrap().content, "still here");
    assert_eq!(broken.writes.get(), 2);
}

#[test]
fn failed_saves_notify_subscribers() {
    let mut store = MemoStore::open(BrokenStore::read_only());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(Box::new(move |event| sink.borrow_mut().push(event)));

    store.create_note(None);
    assert_eq!(
        *seen.borrow(),
        vec![
            StoreEvent::SaveFailed,
            StoreEvent::NotesChanged,
            StoreEvent::SelectionChanged,
        ]
    );
}

#[test]
fn successful_saves_do_not_report_failure() {
    let conn = open_db_in_memory().unwrap();
    let mut store = MemoStore::open(SqliteKvStore::try_new(&conn).unwrap());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(Box::new(move |event| sink.borrow_mut().push(event)));

    store.create_folder(None);
    assert!(!seen.borrow().contains(&StoreEvent::SaveFailed));
}

#[test]
fn repository_reports_store_errors_on_save() {
    let repo = MemoRepository::new(BrokenStore::read_only());
    let err = repo.save(&[], &[], &[]).unwrap_err();
    assert!(matches!(err, PersistError::Store(KvError::Unavailable(_))));
    assert!(err.to_string().contains("quota exceeded"));
}

fn stored_keys(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT key FROM kv_entries ORDER BY key;")
        .unwrap();
    let keys = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    keys
}
