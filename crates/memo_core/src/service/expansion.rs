//! Expanded-folder set for tree display. Session-only.

use crate::model::id::EntityId;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<EntityId>,
}

impl ExpansionState {
    /// Flips membership of `folder_id`; returns the new expanded state.
    pub fn toggle(&mut self, folder_id: EntityId) -> bool {
        if self.expanded.remove(&folder_id) {
            false
        } else {
            self.expanded.insert(folder_id);
            true
        }
    }

    pub fn expand(&mut self, folder_id: EntityId) {
        self.expanded.insert(folder_id);
    }

    pub fn is_expanded(&self, folder_id: EntityId) -> bool {
        self.expanded.contains(&folder_id)
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}
