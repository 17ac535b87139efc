//! Opaque resolver seam
//!
//! The wrapper forwards resolver calls without interpreting them; a call is
//! just a target node plus an opaque payload. The in-memory implementation
//! stores the latest payload per node, which is all the test suites need.

use crate::errors::ResolverError;
use namewrap_core::Node;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// One forwarded resolver call: a declared target node and an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverCall {
    /// The node the payload applies to
    pub node: Node,
    /// Uninterpreted record data
    pub payload: Vec<u8>,
}

/// The resolver seam.
pub trait Resolver: Send + Sync {
    /// Apply one forwarded call.
    fn apply(&self, call: &ResolverCall) -> Result<(), ResolverError>;

    /// Latest payload stored for a node.
    fn get(&self, node: Node) -> Option<Vec<u8>>;
}

/// Shared resolver handle.
pub type SharedResolver = Arc<dyn Resolver>;

/// In-memory reference resolver.
#[derive(Debug, Default)]
pub struct InMemoryResolver {
    records: Mutex<HashMap<Node, Vec<u8>>>,
}

impl InMemoryResolver {
    /// Empty resolver.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Resolver for InMemoryResolver {
    fn apply(&self, call: &ResolverCall) -> Result<(), ResolverError> {
        self.records.lock().insert(call.node, call.payload.clone());
        Ok(())
    }

    fn get(&self, node: Node) -> Option<Vec<u8>> {
        self.records.lock().get(&node).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use namewrap_core::namehash;

    #[test]
    fn stores_latest_payload_per_node() {
        let resolver = InMemoryResolver::new();
        let node = namehash("addr.leaf");

        resolver
            .apply(&ResolverCall { node, payload: vec![1, 2] })
            .unwrap();
        resolver
            .apply(&ResolverCall { node, payload: vec![3] })
            .unwrap();

        assert_eq!(resolver.get(node), Some(vec![3]));
        assert_eq!(resolver.get(namehash("other.leaf")), None);
    }
}
