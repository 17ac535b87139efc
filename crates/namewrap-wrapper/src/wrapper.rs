//! The wrapper and its public operations
//!
//! `NameWrapper` owns the wrapped-record store and the approval state, and
//! drives the registry/registrar/resolver collaborators through their seams.
//! Every operation is a single all-or-nothing transition: all authorization
//! and fuse checks run first, collaborator writes that can be refused run
//! next, and the wrapper's own state is touched last. A failure at any step
//! leaves no partial writes behind.
//!
//! Reconciliation invariant: while a record exists for a node, the registry
//! owner of that node is the wrapper itself (and for leaf nodes the registrar
//! token is held by the wrapper). Unwrap restores direct ownership to the
//! record's owner.

use crate::approvals::Approvals;
use crate::gate;
use crate::records::{RecordStore, WrappedRecord};
use namewrap_core::{Address, Fuses, LabelHash, Node, Result, WrapError};
use namewrap_registry::{
    LeafReceiver, RegistrarError, ResolverCall, SharedRegistrar, SharedRegistry, SharedResolver,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

struct WrapperState {
    records: RecordStore,
    approvals: Approvals,
}

/// Tokenized ownership of name-tree nodes, with irrevocable fuses.
pub struct NameWrapper {
    address: Address,
    leaf_node: Node,
    registry: SharedRegistry,
    registrar: SharedRegistrar,
    resolver: SharedResolver,
    state: Mutex<WrapperState>,
}

impl NameWrapper {
    /// Build a wrapper serving leaves under `leaf_node` (the registrar's base
    /// node).
    pub fn new(
        address: Address,
        leaf_node: Node,
        registry: SharedRegistry,
        registrar: SharedRegistrar,
        resolver: SharedResolver,
    ) -> Self {
        Self {
            address,
            leaf_node,
            registry,
            registrar,
            resolver,
            state: Mutex::new(WrapperState {
                records: RecordStore::new(),
                approvals: Approvals::new(),
            }),
        }
    }

    /// The wrapper's own identity, as seen by the collaborators.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The node under which leaf allocations live.
    pub fn leaf_node(&self) -> Node {
        self.leaf_node
    }

    // === Wrapping ===

    /// Wrap an interior node. The caller must currently be the registry owner
    /// of the derived node (or a registry operator for that owner), and must
    /// have blanket-approved the wrapper in the registry so ownership can be
    /// re-pointed here.
    ///
    /// Direct children of the leaf node must go through [`wrap_leaf`](Self::wrap_leaf),
    /// since their ownership also lives in the allocation registrar.
    pub fn wrap(
        &self,
        parent: Node,
        label: LabelHash,
        fuses: Fuses,
        wrapped_owner: Address,
        caller: Address,
    ) -> Result<Node> {
        let node = parent.child(label);
        if parent == self.leaf_node {
            return Err(WrapError::InvalidParent { parent, node });
        }
        if wrapped_owner.is_zero() {
            return Err(WrapError::unauthorized(Address::ZERO, node));
        }

        let mut state = self.state.lock();
        if state.records.contains(node) {
            return Err(WrapError::AlreadyWrapped { node });
        }
        let registry_owner = self.registry.owner(node);
        if registry_owner.is_zero()
            || (caller != registry_owner
                && !self.registry.is_approved_for_all(registry_owner, caller))
        {
            warn!(%node, %caller, "wrap rejected: caller does not control registry node");
            return Err(WrapError::unauthorized(caller, node));
        }

        // Re-point registry ownership at the wrapper. Rejected here means the
        // owner never approved the wrapper; nothing has been written yet.
        self.registry.set_owner(node, self.address, self.address)?;

        state.records.set(
            node,
            WrappedRecord {
                owner: wrapped_owner,
                fuses,
            },
        );
        state.approvals.clear_delegate(node);
        debug!(%node, %wrapped_owner, %fuses, "node wrapped");
        Ok(node)
    }

    /// Wrap a leaf allocation. The caller must own the allocation in the
    /// registrar (or be a registrar operator for the owner), and must have
    /// blanket-approved the wrapper in the registrar. The allocation token
    /// moves to the wrapper and registry ownership is reclaimed for it.
    pub fn wrap_leaf(
        &self,
        label: LabelHash,
        fuses: Fuses,
        wrapped_owner: Address,
        caller: Address,
    ) -> Result<Node> {
        let node = self.leaf_node.child(label);
        if wrapped_owner.is_zero() {
            return Err(WrapError::unauthorized(Address::ZERO, node));
        }

        let mut state = self.state.lock();
        if state.records.contains(node) {
            return Err(WrapError::AlreadyWrapped { node });
        }
        let token_owner = self.registrar.owner_of(label)?;
        if caller != token_owner && !self.registrar.is_approved_for_all(token_owner, caller) {
            warn!(%node, %caller, "wrap_leaf rejected: caller does not hold the allocation");
            return Err(WrapError::unauthorized(caller, node));
        }

        // Token first (can be refused if the wrapper was never approved),
        // then registry reclaim, which cannot fail once the token is here.
        self.registrar
            .transfer_from(token_owner, self.address, label, self.address)?;
        self.registrar.reclaim(label, self.address, self.address)?;

        state.records.set(
            node,
            WrappedRecord {
                owner: wrapped_owner,
                fuses,
            },
        );
        state.approvals.clear_delegate(node);
        debug!(%node, %wrapped_owner, %fuses, "leaf wrapped");
        Ok(node)
    }

    // === Unwrapping ===

    /// Unwrap an interior node: the record is removed (discarding all fuse
    /// state) and registry ownership reverts to the record's owner.
    pub fn unwrap(&self, parent: Node, label: LabelHash, caller: Address) -> Result<()> {
        let node = parent.child(label);
        if parent == self.leaf_node {
            return Err(WrapError::InvalidParent { parent, node });
        }

        let mut state = self.state.lock();
        gate::require_authorized(&state.records, &state.approvals, node, caller)?;
        gate::require_fuse_clear(&state.records, node, Fuses::CANNOT_UNWRAP)?;

        let owner = state
            .records
            .get(node)
            .map(|r| r.owner)
            .ok_or(WrapError::NotWrapped { node })?;
        // The wrapper is the registry owner of every wrapped node, so this
        // write cannot be refused.
        self.registry.set_owner(node, owner, self.address)?;
        state.records.remove(node);
        state.approvals.clear_delegate(node);
        debug!(%node, %owner, "node unwrapped");
        Ok(())
    }

    /// Unwrap a leaf: as [`unwrap`](Self::unwrap), and the allocation token
    /// returns to the record's owner as well.
    pub fn unwrap_leaf(&self, label: LabelHash, caller: Address) -> Result<()> {
        let node = self.leaf_node.child(label);

        let mut state = self.state.lock();
        gate::require_authorized(&state.records, &state.approvals, node, caller)?;
        gate::require_fuse_clear(&state.records, node, Fuses::CANNOT_UNWRAP)?;
        let owner = state
            .records
            .get(node)
            .map(|r| r.owner)
            .ok_or(WrapError::NotWrapped { node })?;

        // Reclaim while the wrapper still holds the token, then hand the
        // token back; both calls are owner-authorized at the point they run.
        self.registrar.reclaim(label, owner, self.address)?;
        self.registrar
            .transfer_from(self.address, owner, label, self.address)?;

        state.records.remove(node);
        state.approvals.clear_delegate(node);
        debug!(%node, %owner, "leaf unwrapped");
        Ok(())
    }

    // === Fuses ===

    /// Burn fuses on the child of `parent` named by `label`. Pure bitwise OR
    /// into the record: idempotent, monotonic, and never itself gated by any
    /// fuse, since adding restrictions is a one-way ratchet. Only the wrapped
    /// owner may burn (operators and delegates may not).
    pub fn burn_fuses(
        &self,
        parent: Node,
        label: LabelHash,
        fuses: Fuses,
        caller: Address,
    ) -> Result<Fuses> {
        let node = parent.child(label);
        let mut state = self.state.lock();
        let record = state
            .records
            .get_mut(node)
            .ok_or(WrapError::NotWrapped { node })?;
        if caller != record.owner {
            return Err(WrapError::unauthorized(caller, node));
        }
        record.fuses = record.fuses.union(fuses);
        let burned = record.fuses;
        debug!(%node, %burned, "fuses burned");
        Ok(burned)
    }

    // === Subdomains ===

    /// Create or replace the child of a wrapped parent without wrapping it.
    ///
    /// Existence decides the gate: a child unknown to both the registry and
    /// the wrapper is a *create*, gated by `CANNOT_CREATE_SUBDOMAIN` on the
    /// parent; an existing child is a *replace*, gated by
    /// `CANNOT_REPLACE_SUBDOMAIN` on the parent. Replacing a wrapped child
    /// rewrites its record owner and leaves the registry pointing at the
    /// wrapper; the zero address is never a valid wrapped owner.
    pub fn set_subnode_owner(
        &self,
        parent: Node,
        label: LabelHash,
        new_owner: Address,
        caller: Address,
    ) -> Result<Node> {
        let mut state = self.state.lock();
        self.gate_subnode(&state, parent, label, caller)?;
        let child = parent.child(label);

        if state.records.contains(child) {
            // A wrapped record never carries the zero owner; dropping the
            // record is what unwrap is for.
            if new_owner.is_zero() {
                return Err(WrapError::unauthorized(Address::ZERO, child));
            }
            let record = state
                .records
                .get_mut(child)
                .ok_or(WrapError::NotWrapped { node: child })?;
            record.owner = new_owner;
            state.approvals.clear_delegate(child);
        } else {
            self.registry
                .set_subnode_owner(parent, label, new_owner, self.address)?;
        }
        debug!(%parent, %child, %new_owner, "subnode owner set");
        Ok(child)
    }

    /// Create or replace a child of a wrapped parent and wrap it for
    /// `new_owner` in the same transition. Gated exactly like
    /// [`set_subnode_owner`](Self::set_subnode_owner). Fuses on an already
    /// wrapped child only grow.
    pub fn set_subnode_owner_and_wrap(
        &self,
        parent: Node,
        label: LabelHash,
        new_owner: Address,
        fuses: Fuses,
        caller: Address,
    ) -> Result<Node> {
        if new_owner.is_zero() {
            return Err(WrapError::unauthorized(Address::ZERO, parent.child(label)));
        }
        let mut state = self.state.lock();
        self.gate_subnode(&state, parent, label, caller)?;
        let child = parent.child(label);

        if let Some(record) = state.records.get_mut(child) {
            record.owner = new_owner;
            record.fuses = record.fuses.union(fuses);
        } else {
            self.registry
                .set_subnode_owner(parent, label, self.address, self.address)?;
            state.records.set(
                child,
                WrappedRecord {
                    owner: new_owner,
                    fuses,
                },
            );
        }
        state.approvals.clear_delegate(child);
        debug!(%parent, %child, %new_owner, %fuses, "subnode created and wrapped");
        Ok(child)
    }

    /// Parent authorization plus the existence-matched create/replace gate.
    fn gate_subnode(
        &self,
        state: &WrapperState,
        parent: Node,
        label: LabelHash,
        caller: Address,
    ) -> Result<()> {
        gate::require_authorized(&state.records, &state.approvals, parent, caller)?;
        let child = parent.child(label);
        let exists = state.records.contains(child) || self.registry.record_exists(child);
        let gate_bit = if exists {
            Fuses::CANNOT_REPLACE_SUBDOMAIN
        } else {
            Fuses::CANNOT_CREATE_SUBDOMAIN
        };
        gate::require_fuse_clear(&state.records, parent, gate_bit)
    }

    // === Node data ===

    /// Point a wrapped node at a resolver. Gated by `CANNOT_SET_DATA`;
    /// forwarded to the registry unchanged.
    pub fn set_resolver(&self, node: Node, resolver: Address, caller: Address) -> Result<()> {
        let state = self.state.lock();
        gate::require_authorized(&state.records, &state.approvals, node, caller)?;
        gate::require_fuse_clear(&state.records, node, Fuses::CANNOT_SET_DATA)?;
        self.registry.set_resolver(node, resolver, self.address)?;
        Ok(())
    }

    /// Set a wrapped node's TTL. Gated by `CANNOT_SET_DATA`; forwarded to the
    /// registry unchanged.
    pub fn set_ttl(&self, node: Node, ttl: u64, caller: Address) -> Result<()> {
        let state = self.state.lock();
        gate::require_authorized(&state.records, &state.approvals, node, caller)?;
        gate::require_fuse_clear(&state.records, node, Fuses::CANNOT_SET_DATA)?;
        self.registry.set_ttl(node, ttl, self.address)?;
        Ok(())
    }

    /// Forward opaque calls to the resolver. Every call must declare the
    /// asserted node; a mismatch rejects the whole batch before anything is
    /// applied.
    pub fn resolver_passthrough(
        &self,
        node: Node,
        calls: &[ResolverCall],
        caller: Address,
    ) -> Result<()> {
        let state = self.state.lock();
        gate::require_authorized(&state.records, &state.approvals, node, caller)?;
        for call in calls {
            if call.node != node {
                return Err(WrapError::InvalidParent {
                    parent: node,
                    node: call.node,
                });
            }
        }
        for call in calls {
            self.resolver.apply(call)?;
        }
        Ok(())
    }

    // === Token transfer ===

    /// Move wrapped ownership of a node to `to`. Gated by `CANNOT_TRANSFER`;
    /// clears the node's delegate.
    pub fn transfer(&self, node: Node, to: Address, caller: Address) -> Result<()> {
        if to.is_zero() {
            return Err(WrapError::unauthorized(Address::ZERO, node));
        }
        let mut state = self.state.lock();
        gate::require_authorized(&state.records, &state.approvals, node, caller)?;
        gate::require_fuse_clear(&state.records, node, Fuses::CANNOT_TRANSFER)?;
        let record = state
            .records
            .get_mut(node)
            .ok_or(WrapError::NotWrapped { node })?;
        let from = record.owner;
        record.owner = to;
        state.approvals.clear_delegate(node);
        debug!(%node, %from, %to, "wrapped ownership transferred");
        Ok(())
    }

    // === Approvals ===

    /// Caller grants or revokes blanket operator rights over all nodes they
    /// own through the wrapper.
    pub fn set_approval_for_all(&self, operator: Address, approved: bool, caller: Address) {
        self.state
            .lock()
            .approvals
            .set_operator(caller, operator, approved);
    }

    /// Whether `operator` holds blanket rights over `owner`'s wrapped nodes.
    pub fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.state.lock().approvals.is_operator(owner, operator)
    }

    /// Set the single delegate for one wrapped node. Owner-only; a zero
    /// delegate clears.
    pub fn approve(&self, node: Node, delegate: Address, caller: Address) -> Result<()> {
        let mut state = self.state.lock();
        let record = state
            .records
            .get(node)
            .ok_or(WrapError::NotWrapped { node })?;
        if caller != record.owner {
            return Err(WrapError::unauthorized(caller, node));
        }
        state.approvals.set_delegate(node, delegate);
        Ok(())
    }

    /// The node's delegate, if any.
    pub fn get_approved(&self, node: Node) -> Option<Address> {
        self.state.lock().approvals.delegate(node)
    }

    // === Views ===

    /// The wrapped owner of a node, if it is wrapped.
    pub fn owner_of(&self, node: Node) -> Option<Address> {
        self.state.lock().records.get(node).map(|r| r.owner)
    }

    /// The node's fuse state; `Fuses::NONE` while unwrapped.
    pub fn fuses_of(&self, node: Node) -> Fuses {
        gate::fuses_of(&self.state.lock().records, node)
    }

    /// Whether the node can still be unwrapped.
    pub fn can_unwrap(&self, node: Node) -> bool {
        !self.fuses_of(node).contains(Fuses::CANNOT_UNWRAP)
    }

    /// Whether the node's resolver/TTL can still be changed.
    pub fn can_set_data(&self, node: Node) -> bool {
        !self.fuses_of(node).contains(Fuses::CANNOT_SET_DATA)
    }

    /// Whether wrapped ownership of the node can still be transferred.
    pub fn can_transfer(&self, node: Node) -> bool {
        !self.fuses_of(node).contains(Fuses::CANNOT_TRANSFER)
    }

    /// Whether new children can still be created under the node.
    pub fn can_create_subdomain(&self, node: Node) -> bool {
        !self.fuses_of(node).contains(Fuses::CANNOT_CREATE_SUBDOMAIN)
    }

    /// Whether existing children under the node can still be reassigned.
    pub fn can_replace_subdomain(&self, node: Node) -> bool {
        !self.fuses_of(node).contains(Fuses::CANNOT_REPLACE_SUBDOMAIN)
    }
}

/// Inbound safe transfers of a leaf allocation wrap the leaf for the sender,
/// with no restrictions. By construction the hook only fires from the
/// registrar the wrapper was registered with, after the token has already
/// moved to the wrapper; rejecting unwinds the transfer on the registrar side.
impl LeafReceiver for NameWrapper {
    fn on_leaf_received(
        &self,
        operator: Address,
        from: Address,
        label: LabelHash,
        _data: &[u8],
    ) -> std::result::Result<(), RegistrarError> {
        let node = self.leaf_node.child(label);
        let mut state = self.state.lock();
        if state.records.contains(node) {
            return Err(RegistrarError::ReceiverRejected {
                reason: WrapError::AlreadyWrapped { node }.to_string(),
            });
        }
        self.registrar.reclaim(label, self.address, self.address)?;
        state.records.set(
            node,
            WrappedRecord {
                owner: from,
                fuses: Fuses::NONE,
            },
        );
        state.approvals.clear_delegate(node);
        debug!(%node, %from, %operator, "leaf received and wrapped");
        Ok(())
    }
}
