//! Session services over the model and repository layers.
//!
//! # Responsibility
//! - Resolve the current note from mode and selection.
//! - Track expanded folders for display.
//! - Expose the command/query store used by presentation layers.

pub mod expansion;
pub mod memo_store;
pub mod selection;
