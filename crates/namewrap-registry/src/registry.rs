//! The authoritative name registry seam
//!
//! The registry owns the canonical parent→child ownership mapping plus the
//! resolver/TTL metadata for each node. The wrapper drives it through
//! [`NameRegistry`]; [`InMemoryRegistry`] is the reference implementation used
//! by the bootstrap fixture and tests.
//!
//! Authorization mirrors the external system: a node is writable by its owner
//! or by an operator the owner has blanket-approved, and a child node is
//! created or reassigned by whoever is authorized for the *parent*.

use crate::errors::RegistryError;
use namewrap_core::{Address, LabelHash, Node};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// The registry seam consumed by the wrapper core.
pub trait NameRegistry: Send + Sync {
    /// Current owner of a node; `Address::ZERO` when no record exists.
    fn owner(&self, node: Node) -> Address;

    /// Resolver address recorded for a node.
    fn resolver(&self, node: Node) -> Address;

    /// TTL recorded for a node.
    fn ttl(&self, node: Node) -> u64;

    /// Whether any record exists for the node (non-zero owner).
    fn record_exists(&self, node: Node) -> bool;

    /// Reassign a node's owner. Caller must be authorized for the node.
    fn set_owner(
        &self,
        node: Node,
        new_owner: Address,
        caller: Address,
    ) -> Result<(), RegistryError>;

    /// Create or reassign the child of `parent` named by `label`, returning
    /// the derived child node. Caller must be authorized for the parent.
    fn set_subnode_owner(
        &self,
        parent: Node,
        label: LabelHash,
        new_owner: Address,
        caller: Address,
    ) -> Result<Node, RegistryError>;

    /// Set a node's resolver. Caller must be authorized for the node.
    fn set_resolver(
        &self,
        node: Node,
        resolver: Address,
        caller: Address,
    ) -> Result<(), RegistryError>;

    /// Set a node's TTL. Caller must be authorized for the node.
    fn set_ttl(&self, node: Node, ttl: u64, caller: Address) -> Result<(), RegistryError>;

    /// Grant or revoke blanket operator rights over all of `owner`'s nodes.
    fn set_approval_for_all(&self, owner: Address, operator: Address, approved: bool);

    /// Whether `operator` holds blanket rights over `owner`'s nodes.
    fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool;
}

/// Shared registry handle.
pub type SharedRegistry = Arc<dyn NameRegistry>;

#[derive(Debug, Clone, Copy)]
struct RegistryRecord {
    owner: Address,
    resolver: Address,
    ttl: u64,
}

impl Default for RegistryRecord {
    fn default() -> Self {
        Self {
            owner: Address::ZERO,
            resolver: Address::ZERO,
            ttl: 0,
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    records: HashMap<Node, RegistryRecord>,
    operators: HashSet<(Address, Address)>,
}

/// In-memory reference registry.
#[derive(Debug)]
pub struct InMemoryRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryRegistry {
    /// Build a registry whose root node is owned by `root_owner`.
    pub fn new(root_owner: Address) -> Self {
        let mut records = HashMap::new();
        records.insert(
            Node::ROOT,
            RegistryRecord {
                owner: root_owner,
                ..RegistryRecord::default()
            },
        );
        Self {
            state: Mutex::new(RegistryState {
                records,
                operators: HashSet::new(),
            }),
        }
    }
}

impl RegistryState {
    fn owner_of(&self, node: Node) -> Address {
        self.records.get(&node).map(|r| r.owner).unwrap_or(Address::ZERO)
    }

    fn require_authorized(&self, node: Node, caller: Address) -> Result<(), RegistryError> {
        let owner = self.owner_of(node);
        if !owner.is_zero()
            && (caller == owner || self.operators.contains(&(owner, caller)))
        {
            Ok(())
        } else {
            Err(RegistryError::NotAuthorized { caller, node })
        }
    }
}

impl NameRegistry for InMemoryRegistry {
    fn owner(&self, node: Node) -> Address {
        self.state.lock().owner_of(node)
    }

    fn resolver(&self, node: Node) -> Address {
        self.state
            .lock()
            .records
            .get(&node)
            .map(|r| r.resolver)
            .unwrap_or(Address::ZERO)
    }

    fn ttl(&self, node: Node) -> u64 {
        self.state.lock().records.get(&node).map(|r| r.ttl).unwrap_or(0)
    }

    fn record_exists(&self, node: Node) -> bool {
        !self.owner(node).is_zero()
    }

    fn set_owner(
        &self,
        node: Node,
        new_owner: Address,
        caller: Address,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        state.require_authorized(node, caller)?;
        state.records.entry(node).or_default().owner = new_owner;
        debug!(%node, %new_owner, "registry owner changed");
        Ok(())
    }

    fn set_subnode_owner(
        &self,
        parent: Node,
        label: LabelHash,
        new_owner: Address,
        caller: Address,
    ) -> Result<Node, RegistryError> {
        let mut state = self.state.lock();
        state.require_authorized(parent, caller)?;
        let child = parent.child(label);
        state.records.entry(child).or_default().owner = new_owner;
        debug!(%parent, %label, %child, %new_owner, "registry subnode owner set");
        Ok(child)
    }

    fn set_resolver(
        &self,
        node: Node,
        resolver: Address,
        caller: Address,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        state.require_authorized(node, caller)?;
        state.records.entry(node).or_default().resolver = resolver;
        Ok(())
    }

    fn set_ttl(&self, node: Node, ttl: u64, caller: Address) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        state.require_authorized(node, caller)?;
        state.records.entry(node).or_default().ttl = ttl;
        Ok(())
    }

    fn set_approval_for_all(&self, owner: Address, operator: Address, approved: bool) {
        let mut state = self.state.lock();
        if approved {
            state.operators.insert((owner, operator));
        } else {
            state.operators.remove(&(owner, operator));
        }
    }

    fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.state.lock().operators.contains(&(owner, operator))
    }
}
