//! Approval and delegation state
//!
//! Two tiers: a blanket owner→operator approval covering all of an owner's
//! wrapped nodes, and a per-node delegate covering exactly one node. Approval
//! gates *who* may exercise a capability; fuses gate the capability itself;
//! delegation is never fuse-gated.
//!
//! The per-node delegate is cleared whenever the node's wrapped ownership
//! changes. Blanket approvals are keyed by the granting owner, so they never
//! carry over to a new owner.

use namewrap_core::{Address, Node};
use std::collections::{HashMap, HashSet};

/// Blanket and per-node approval state.
#[derive(Debug, Default)]
pub struct Approvals {
    operators: HashSet<(Address, Address)>,
    delegates: HashMap<Node, Address>,
}

impl Approvals {
    /// Empty approval state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant or revoke `operator` blanket rights over all of `owner`'s nodes.
    pub fn set_operator(&mut self, owner: Address, operator: Address, approved: bool) {
        if approved {
            self.operators.insert((owner, operator));
        } else {
            self.operators.remove(&(owner, operator));
        }
    }

    /// Whether `operator` holds blanket rights over `owner`'s nodes.
    pub fn is_operator(&self, owner: Address, operator: Address) -> bool {
        self.operators.contains(&(owner, operator))
    }

    /// Set the single delegate for one node.
    pub fn set_delegate(&mut self, node: Node, delegate: Address) {
        if delegate.is_zero() {
            self.delegates.remove(&node);
        } else {
            self.delegates.insert(node, delegate);
        }
    }

    /// The node's delegate, if any.
    pub fn delegate(&self, node: Node) -> Option<Address> {
        self.delegates.get(&node).copied()
    }

    /// Drop the node's delegate. Called on every ownership change.
    pub fn clear_delegate(&mut self, node: Node) {
        self.delegates.remove(&node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use namewrap_core::namehash;

    #[test]
    fn blanket_approval_is_per_owner() {
        let mut approvals = Approvals::new();
        let alice = Address::derive("alice");
        let bob = Address::derive("bob");
        let operator = Address::derive("operator");

        approvals.set_operator(alice, operator, true);
        assert!(approvals.is_operator(alice, operator));
        assert!(!approvals.is_operator(bob, operator));

        approvals.set_operator(alice, operator, false);
        assert!(!approvals.is_operator(alice, operator));
    }

    #[test]
    fn delegate_is_single_and_clearable() {
        let mut approvals = Approvals::new();
        let node = namehash("sub.leaf");
        let first = Address::derive("first");
        let second = Address::derive("second");

        approvals.set_delegate(node, first);
        approvals.set_delegate(node, second);
        assert_eq!(approvals.delegate(node), Some(second));

        approvals.clear_delegate(node);
        assert_eq!(approvals.delegate(node), None);

        approvals.set_delegate(node, first);
        approvals.set_delegate(node, Address::ZERO);
        assert_eq!(approvals.delegate(node), None);
    }
}
