//! Domain model for the hierarchical note store.
//!
//! # Responsibility
//! - Define notes, folders and the two in-memory partitions that hold them
//!   (active entity tree and trash).
//! - Provide the identity allocator shared by notes and folders.
//!
//! # Invariants
//! - Notes and folders share one id space.
//! - A note id lives in exactly one place: the top-level list, one folder's
//!   note list, or the trash.
//! - Containers keep insertion order, most recent first.

pub mod folder;
pub mod id;
pub mod note;
pub mod trash;
pub mod tree;
