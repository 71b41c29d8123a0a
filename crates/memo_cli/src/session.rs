//! Executes parsed commands against a store and renders the result.
//!
//! # Responsibility
//! - Route each command to the matching store operation.
//! - Render the current view (active tree or trash) as plain text.

use crate::command::{Command, HELP};
use memo_core::{
    Clock, CurrentNote, Folder, KvStore, MemoStore, NotePatch, StoreEvent, ViewMode,
};
use std::io::{self, Write};

/// Whether the session keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Message shown to the user for events they must not miss.
pub fn user_notice(event: StoreEvent) -> Option<&'static str> {
    match event {
        StoreEvent::SaveFailed => Some("warning: the last change could not be saved"),
        _ => None,
    }
}

pub fn execute<K: KvStore, C: Clock>(
    store: &mut MemoStore<K, C>,
    command: Command,
    out: &mut impl Write,
) -> io::Result<Flow> {
    match command {
        Command::List => render_view(store, out)?,
        Command::ToggleTrash => {
            store.toggle_trash();
            render_view(store, out)?;
        }
        Command::Show => render_current(store, out)?,
        Command::NewNote(folder) => match store.create_note(folder) {
            Some(id) => writeln!(out, "created note {id}")?,
            None => writeln!(out, "no such folder")?,
        },
        Command::NewFolder(parent) => match store.create_folder(parent) {
            Some(id) => writeln!(out, "created folder {id}; name it with `rename {id} <name>`")?,
            None => writeln!(out, "no such folder")?,
        },
        Command::Rename { id, name } => report(out, store.rename_folder(id, &name), "renamed")?,
        Command::Select(id) => {
            match store.mode() {
                ViewMode::Active => store.select_note(id),
                ViewMode::Trash => store.select_trashed_note(id),
            }
            render_current(store, out)?;
        }
        Command::SetTitle(title) => {
            report(out, store.update_note(NotePatch::title(title)), "updated")?
        }
        Command::SetContent(content) => {
            report(out, store.update_note(NotePatch::content(content)), "updated")?
        }
        Command::Append(text) => report(out, store.append_to_current(&text), "updated")?,
        Command::DeleteNote(id) => report(out, store.delete_note(id), "moved to trash")?,
        Command::DeleteFolder { id, parent } => {
            report(out, store.delete_folder(id, parent), "folder deleted")?
        }
        Command::Restore(id) => report(out, store.restore_note(id), "restored")?,
        Command::ToggleFolder(id) => {
            let expanded = store.toggle_folder_expanded(id);
            writeln!(out, "{}", if expanded { "expanded" } else { "collapsed" })?;
        }
        Command::MoveNote { id, folder } => report(out, store.move_note(id, folder), "moved")?,
        Command::MoveFolder { id, parent } => {
            report(out, store.move_folder(id, parent), "moved")?
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

fn report(out: &mut impl Write, changed: bool, done: &str) -> io::Result<()> {
    if changed {
        writeln!(out, "{done}")
    } else {
        writeln!(out, "nothing changed")
    }
}

fn render_view<K: KvStore, C: Clock>(
    store: &MemoStore<K, C>,
    out: &mut impl Write,
) -> io::Result<()> {
    let selected = store.selection().selected_id();
    let marker = |id| if selected == Some(id) { '*' } else { ' ' };

    if store.mode() == ViewMode::Trash {
        writeln!(out, "[trash]")?;
        if store.list_trash().is_empty() {
            writeln!(out, "  (empty)")?;
        }
        for note in store.list_trash() {
            writeln!(out, "{} {} {}", marker(note.id), note.id, note.display_title())?;
        }
        return Ok(());
    }

    for folder in store.list_folders() {
        render_folder(store, folder, 0, out)?;
    }
    for note in store.list_top_level() {
        writeln!(out, "{} {} {}", marker(note.id), note.id, note.display_title())?;
    }
    Ok(())
}

fn render_folder<K: KvStore, C: Clock>(
    store: &MemoStore<K, C>,
    folder: &Folder,
    depth: usize,
    out: &mut impl Write,
) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    let expanded = store.is_expanded(folder.id);
    writeln!(
        out,
        "{indent}{} {} {}/ ({})",
        if expanded { '-' } else { '+' },
        folder.id,
        folder.name,
        folder.note_count()
    )?;
    if !expanded {
        return Ok(());
    }
    for child in &folder.subfolders {
        render_folder(store, child, depth + 1, out)?;
    }
    let selected = store.selection().active_id;
    for note in &folder.notes {
        let marker = if selected == Some(note.id) { '*' } else { ' ' };
        writeln!(out, "{indent}  {marker} {} {}", note.id, note.display_title())?;
    }
    Ok(())
}

fn render_current<K: KvStore, C: Clock>(
    store: &MemoStore<K, C>,
    out: &mut impl Write,
) -> io::Result<()> {
    match store.current_note() {
        None => writeln!(out, "no note selected"),
        Some(current) => {
            let note = current.note();
            let tag = match current {
                CurrentNote::Active(_) => "",
                CurrentNote::Trashed(_) => " (trashed, read-only)",
            };
            writeln!(out, "# {}{tag}", note.display_title())?;
            writeln!(out, "{}", note.content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{execute, user_notice, Flow};
    use crate::command::parse;
    use memo_core::db::open_db_in_memory;
    use memo_core::{MemoStore, SqliteKvStore, StoreEvent};

    fn run<K: memo_core::KvStore>(store: &mut MemoStore<K>, line: &str) -> String {
        let mut out = Vec::new();
        execute(store, parse(line).unwrap(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn session_creates_edits_and_lists_notes() {
        let conn = open_db_in_memory().unwrap();
        let mut store = MemoStore::open(SqliteKvStore::try_new(&conn).unwrap());

        assert!(run(&mut store, "new").starts_with("created note"));
        run(&mut store, "title Groceries");
        run(&mut store, "append milk");

        let listing = run(&mut store, "ls");
        assert!(listing.contains("* "));
        assert!(listing.contains("Groceries"));
        assert!(run(&mut store, "show").contains("milk"));
    }

    #[test]
    fn trash_view_is_read_only() {
        let conn = open_db_in_memory().unwrap();
        let mut store = MemoStore::open(SqliteKvStore::try_new(&conn).unwrap());
        let id = store.create_note(None).unwrap();
        store.delete_note(id);

        assert!(run(&mut store, "trash").contains("Untitled"));
        run(&mut store, &format!("select {id}"));
        assert!(run(&mut store, "show").contains("read-only"));
        assert_eq!(run(&mut store, "edit nope"), "nothing changed\n");
    }

    #[test]
    fn collapsed_folders_hide_their_notes() {
        let conn = open_db_in_memory().unwrap();
        let mut store = MemoStore::open(SqliteKvStore::try_new(&conn).unwrap());
        let folder = store.create_folder(None).unwrap();
        store.rename_folder(folder, "Work");
        store.create_note(Some(folder));
        store.update_note(memo_core::NotePatch::title("Plan"));

        assert!(run(&mut store, "ls").contains("Plan"));
        assert_eq!(run(&mut store, &format!("toggle {folder}")), "collapsed\n");
        let listing = run(&mut store, "ls");
        assert!(listing.contains("Work/ (1)"));
        assert!(!listing.contains("Plan"));
    }

    #[test]
    fn quit_ends_session() {
        let conn = open_db_in_memory().unwrap();
        let mut store = MemoStore::open(SqliteKvStore::try_new(&conn).unwrap());
        let mut out = Vec::new();
        let flow = execute(&mut store, parse("quit").unwrap(), &mut out).unwrap();
        assert_eq!(flow, Flow::Exit);
    }

    #[test]
    fn only_failed_saves_produce_notices() {
        assert!(user_notice(StoreEvent::SaveFailed).is_some());
        assert_eq!(user_notice(StoreEvent::NotesChanged), None);
        assert_eq!(user_notice(StoreEvent::SelectionChanged), None);
    }
}
