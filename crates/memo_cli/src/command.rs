//! Line parser for session commands.
//!
//! # Invariants
//! - Parsing is pure; nothing here touches the store.
//! - Text arguments keep their inner spacing; only the separator after the
//!   verb (and ids) is consumed.

use memo_core::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    ToggleTrash,
    Show,
    NewNote(Option<EntityId>),
    NewFolder(Option<EntityId>),
    Rename { id: EntityId, name: String },
    Select(EntityId),
    SetTitle(String),
    SetContent(String),
    Append(String),
    DeleteNote(EntityId),
    DeleteFolder {
        id: EntityId,
        parent: Option<EntityId>,
    },
    Restore(EntityId),
    ToggleFolder(EntityId),
    MoveNote {
        id: EntityId,
        folder: Option<EntityId>,
    },
    MoveFolder {
        id: EntityId,
        parent: Option<EntityId>,
    },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidId(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::UnknownCommand(verb) => write!(f, "unknown command `{verb}`; try `help`"),
            Self::MissingArgument(name) => write!(f, "missing argument <{name}>"),
            Self::InvalidId(raw) => write!(f, "`{raw}` is not a valid id"),
        }
    }
}

impl Error for ParseError {}

pub const HELP: &str = "\
ls                      show notes and folders of the current view
trash                   switch between active notes and trash
show                    print the current note
new [folder]            create a note (top level or inside folder)
mkdir [parent]          create a folder
rename <folder> <name>  rename a folder
select <id>             select a note in the current view
title <text>            set the current note's title
edit <text>             replace the current note's content
append <text>           append to the current note's content
rm <note>               move a note to the trash
rmdir <folder> [parent] delete a folder and everything in it
restore <note>          move a trashed note back to the top level
toggle <folder>         expand or collapse a folder
mv <note> [folder]      move a note into a folder or the top level
mvdir <folder> [parent] move a folder under another or to the top level
quit                    leave the session";

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (verb, rest) = split_word(line);
    if verb.is_empty() {
        return Err(ParseError::Empty);
    }

    let command = match verb {
        "ls" => Command::List,
        "trash" => Command::ToggleTrash,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "new" => Command::NewNote(optional_id(rest)?),
        "mkdir" => Command::NewFolder(optional_id(rest)?),
        "rename" => {
            let (id, name) = split_word(rest);
            Command::Rename {
                id: required_id(id, "folder")?,
                name: name.to_string(),
            }
        }
        "select" => Command::Select(required_id(rest, "id")?),
        "title" => Command::SetTitle(rest.to_string()),
        "edit" => Command::SetContent(rest.to_string()),
        "append" => Command::Append(rest.to_string()),
        "rm" => Command::DeleteNote(required_id(rest, "note")?),
        "rmdir" => {
            let (id, parent) = split_word(rest);
            Command::DeleteFolder {
                id: required_id(id, "folder")?,
                parent: optional_id(parent)?,
            }
        }
        "restore" => Command::Restore(required_id(rest, "note")?),
        "toggle" => Command::ToggleFolder(required_id(rest, "folder")?),
        "mv" => {
            let (id, folder) = split_word(rest);
            Command::MoveNote {
                id: required_id(id, "note")?,
                folder: optional_id(folder)?,
            }
        }
        "mvdir" => {
            let (id, parent) = split_word(rest);
            Command::MoveFolder {
                id: required_id(id, "folder")?,
                parent: optional_id(parent)?,
            }
        }
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(command)
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn required_id(raw: &str, name: &'static str) -> Result<EntityId, ParseError> {
    optional_id(raw)?.ok_or(ParseError::MissingArgument(name))
}

fn optional_id(raw: &str) -> Result<Option<EntityId>, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| ParseError::InvalidId(raw.to_string()))
}
