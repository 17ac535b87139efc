//! Wrapped record storage
//!
//! Pure key-value semantics, no business logic. The store's one invariant is
//! definitional: a record exists for a node if and only if that node is
//! currently wrapped. Wrapping inserts the record, unwrapping removes it, and
//! removal discards fuse state entirely; fuses never persist across an
//! unwrap/rewrap cycle.

use namewrap_core::{Address, Fuses, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The wrapper's own view of one wrapped node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedRecord {
    /// Who controls the node through the wrapper
    pub owner: Address,
    /// Burned restrictions
    pub fuses: Fuses,
}

/// Node → record mapping.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: HashMap<Node, WrappedRecord>,
}

impl RecordStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The record for a node, if it is wrapped.
    pub fn get(&self, node: Node) -> Option<&WrappedRecord> {
        self.records.get(&node)
    }

    /// Mutable record access, if the node is wrapped.
    pub fn get_mut(&mut self, node: Node) -> Option<&mut WrappedRecord> {
        self.records.get_mut(&node)
    }

    /// Insert or replace the record for a node.
    pub fn set(&mut self, node: Node, record: WrappedRecord) {
        self.records.insert(node, record);
    }

    /// Remove a node's record, discarding its fuse state.
    pub fn remove(&mut self, node: Node) -> Option<WrappedRecord> {
        self.records.remove(&node)
    }

    /// Whether the node is wrapped.
    pub fn contains(&self, node: Node) -> bool {
        self.records.contains_key(&node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use namewrap_core::namehash;

    #[test]
    fn record_exists_iff_wrapped() {
        let mut store = RecordStore::new();
        let node = namehash("wrapped.leaf");
        assert!(!store.contains(node));

        store.set(
            node,
            WrappedRecord {
                owner: Address::derive("alice"),
                fuses: Fuses::CANNOT_UNWRAP,
            },
        );
        assert!(store.contains(node));
        assert_eq!(store.get(node).map(|r| r.fuses), Some(Fuses::CANNOT_UNWRAP));

        let removed = store.remove(node).expect("record was present");
        assert_eq!(removed.fuses, Fuses::CANNOT_UNWRAP);
        assert!(store.get(node).is_none());
    }
}
