//! Persistence layer.
//!
//! # Responsibility
//! - Define the durable key-value contract and its SQLite backend.
//! - Map the in-memory partitions to and from their JSON documents.
//!
//! # Invariants
//! - Writes replace whole documents; there is no partial patching.
//! - Read failures never propagate past `MemoRepository::load`.

pub mod kv_repo;
pub mod memo_repo;
