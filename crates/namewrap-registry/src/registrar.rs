//! The leaf allocation registrar seam
//!
//! The registrar issues time-bounded ownership of top-level leaf labels under
//! a fixed base node. Allocations are ERC721-style tokens: they can be
//! transferred directly, and a safe transfer gives the recipient an acceptance
//! hook ([`LeafReceiver`]) that can reject the transfer.
//!
//! The registrar also owns the base node in the registry, so registering or
//! reclaiming an allocation re-points the registry's derived child node.

use crate::clock::SharedClock;
use crate::errors::RegistrarError;
use crate::registry::SharedRegistry;
use namewrap_core::{Address, LabelHash, Node};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Acceptance hook for recipients of a safe leaf transfer.
///
/// Invoked after the allocation's ownership has moved to the recipient; the
/// transfer is unwound if the hook rejects. The hook may call back into the
/// registrar (the registrar holds no internal lock across the call).
pub trait LeafReceiver: Send + Sync {
    /// Accept or reject an inbound leaf allocation.
    fn on_leaf_received(
        &self,
        operator: Address,
        from: Address,
        label: LabelHash,
        data: &[u8],
    ) -> Result<(), RegistrarError>;
}

/// The allocation authority seam consumed by the wrapper core.
pub trait LeafRegistrar: Send + Sync {
    /// The registry node under which this registrar issues leaves.
    fn base_node(&self) -> Node;

    /// Current allocation owner; errors once the allocation has expired.
    fn owner_of(&self, label: LabelHash) -> Result<Address, RegistrarError>;

    /// Whether the label can be registered (never allocated, or expired).
    fn available(&self, label: LabelHash) -> bool;

    /// Allocate a label to `owner` for `duration` seconds, returning the
    /// expiry. Controller-only; also points the registry's derived child node
    /// at `owner`.
    fn register(
        &self,
        label: LabelHash,
        owner: Address,
        duration: u64,
        caller: Address,
    ) -> Result<u64, RegistrarError>;

    /// Re-assert registry ownership of the derived child node on behalf of the
    /// allocation owner (or an approved operator).
    fn reclaim(
        &self,
        label: LabelHash,
        new_registry_owner: Address,
        caller: Address,
    ) -> Result<(), RegistrarError>;

    /// Move allocation ownership. Caller must be `from` or an operator
    /// approved by `from`; the registry is left untouched.
    fn transfer_from(
        &self,
        from: Address,
        to: Address,
        label: LabelHash,
        caller: Address,
    ) -> Result<(), RegistrarError>;

    /// [`transfer_from`](Self::transfer_from), then invoke the recipient's
    /// acceptance hook if one is registered; unwinds on rejection.
    fn safe_transfer_from(
        &self,
        from: Address,
        to: Address,
        label: LabelHash,
        data: &[u8],
        caller: Address,
    ) -> Result<(), RegistrarError>;

    /// Grant or revoke blanket operator rights over all of `owner`'s
    /// allocations.
    fn set_approval_for_all(&self, owner: Address, operator: Address, approved: bool);

    /// Whether `operator` holds blanket rights over `owner`'s allocations.
    fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool;

    /// Add an address allowed to call [`register`](Self::register).
    fn add_controller(&self, controller: Address);

    /// Register the acceptance hook for a recipient address.
    fn register_receiver(&self, address: Address, receiver: Arc<dyn LeafReceiver>);
}

/// Shared registrar handle.
pub type SharedRegistrar = Arc<dyn LeafRegistrar>;

#[derive(Debug, Clone, Copy)]
struct Allocation {
    owner: Address,
    expiry: u64,
}

#[derive(Default)]
struct RegistrarState {
    allocations: HashMap<LabelHash, Allocation>,
    controllers: HashSet<Address>,
    operators: HashSet<(Address, Address)>,
}

/// In-memory reference registrar.
pub struct InMemoryRegistrar {
    address: Address,
    base_node: Node,
    registry: SharedRegistry,
    clock: SharedClock,
    state: Mutex<RegistrarState>,
    receivers: Mutex<HashMap<Address, Arc<dyn LeafReceiver>>>,
}

impl InMemoryRegistrar {
    /// Build a registrar issuing leaves under `base_node`.
    ///
    /// The registrar must already be (or later become) the registry owner of
    /// `base_node` for register/reclaim to take effect there.
    pub fn new(
        address: Address,
        base_node: Node,
        registry: SharedRegistry,
        clock: SharedClock,
    ) -> Self {
        Self {
            address,
            base_node,
            registry,
            clock,
            state: Mutex::new(RegistrarState::default()),
            receivers: Mutex::new(HashMap::new()),
        }
    }

    /// The registrar's own identity, as seen by the registry.
    pub fn address(&self) -> Address {
        self.address
    }

    fn live_allocation(
        state: &RegistrarState,
        label: LabelHash,
        now: u64,
    ) -> Result<Allocation, RegistrarError> {
        match state.allocations.get(&label) {
            Some(alloc) if alloc.expiry > now => Ok(*alloc),
            _ => Err(RegistrarError::NoAllocation { label }),
        }
    }

    fn transfer_inner(
        &self,
        from: Address,
        to: Address,
        label: LabelHash,
        caller: Address,
    ) -> Result<(), RegistrarError> {
        let mut state = self.state.lock();
        let alloc = Self::live_allocation(&state, label, self.clock.now())?;
        if alloc.owner != from {
            return Err(RegistrarError::WrongOwner {
                label,
                claimed: from,
                actual: alloc.owner,
            });
        }
        if caller != from && !state.operators.contains(&(from, caller)) {
            return Err(RegistrarError::NotAuthorized { caller, label });
        }
        state
            .allocations
            .get_mut(&label)
            .ok_or(RegistrarError::NoAllocation { label })?
            .owner = to;
        debug!(%label, %from, %to, "leaf allocation transferred");
        Ok(())
    }
}

impl LeafRegistrar for InMemoryRegistrar {
    fn base_node(&self) -> Node {
        self.base_node
    }

    fn owner_of(&self, label: LabelHash) -> Result<Address, RegistrarError> {
        let state = self.state.lock();
        Self::live_allocation(&state, label, self.clock.now()).map(|a| a.owner)
    }

    fn available(&self, label: LabelHash) -> bool {
        let state = self.state.lock();
        Self::live_allocation(&state, label, self.clock.now()).is_err()
    }

    fn register(
        &self,
        label: LabelHash,
        owner: Address,
        duration: u64,
        caller: Address,
    ) -> Result<u64, RegistrarError> {
        let expiry = {
            let mut state = self.state.lock();
            if !state.controllers.contains(&caller) {
                return Err(RegistrarError::NotController { caller });
            }
            let now = self.clock.now();
            if Self::live_allocation(&state, label, now).is_ok() {
                return Err(RegistrarError::NotAvailable { label });
            }
            let expiry = now.saturating_add(duration);
            state.allocations.insert(label, Allocation { owner, expiry });
            expiry
        };
        // The registrar owns the base node, so this write cannot be refused.
        self.registry
            .set_subnode_owner(self.base_node, label, owner, self.address)?;
        debug!(%label, %owner, expiry, "leaf allocation registered");
        Ok(expiry)
    }

    fn reclaim(
        &self,
        label: LabelHash,
        new_registry_owner: Address,
        caller: Address,
    ) -> Result<(), RegistrarError> {
        {
            let state = self.state.lock();
            let alloc = Self::live_allocation(&state, label, self.clock.now())?;
            if caller != alloc.owner && !state.operators.contains(&(alloc.owner, caller)) {
                return Err(RegistrarError::NotAuthorized { caller, label });
            }
        }
        self.registry
            .set_subnode_owner(self.base_node, label, new_registry_owner, self.address)?;
        debug!(%label, %new_registry_owner, "registry ownership reclaimed");
        Ok(())
    }

    fn transfer_from(
        &self,
        from: Address,
        to: Address,
        label: LabelHash,
        caller: Address,
    ) -> Result<(), RegistrarError> {
        self.transfer_inner(from, to, label, caller)
    }

    fn safe_transfer_from(
        &self,
        from: Address,
        to: Address,
        label: LabelHash,
        data: &[u8],
        caller: Address,
    ) -> Result<(), RegistrarError> {
        self.transfer_inner(from, to, label, caller)?;
        let receiver = self.receivers.lock().get(&to).cloned();
        if let Some(receiver) = receiver {
            // No internal lock is held here; the hook may call back in.
            if let Err(err) = receiver.on_leaf_received(caller, from, label, data) {
                warn!(%label, %to, %err, "receiver rejected leaf, unwinding transfer");
                if let Some(alloc) = self.state.lock().allocations.get_mut(&label) {
                    alloc.owner = from;
                }
                return Err(RegistrarError::ReceiverRejected {
                    reason: err.to_string(),
                });
            }
        }
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

    fn add_controller(&self, controller: Address) {
        self.state.lock().controllers.insert(controller);
    }

    fn register_receiver(&self, address: Address, receiver: Arc<dyn LeafReceiver>) {
        self.receivers.lock().insert(address, receiver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::registry::InMemoryRegistry;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct StepClock(AtomicU64);

    impl Clock for StepClock {
        fn now(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct Fixture {
        registrar: InMemoryRegistrar,
        registry: SharedRegistry,
        clock: Arc<StepClock>,
        controller: Address,
    }

    fn setup() -> Fixture {
        let controller = Address::derive("controller");
        let registrar_addr = Address::derive("registrar");
        let registry: SharedRegistry = Arc::new(InMemoryRegistry::new(controller));
        let clock = Arc::new(StepClock(AtomicU64::new(1_000)));
        let base = Node::ROOT.child(LabelHash::new("leaf"));
        registry
            .set_subnode_owner(Node::ROOT, LabelHash::new("leaf"), registrar_addr, controller)
            .unwrap();
        let registrar = InMemoryRegistrar::new(
            registrar_addr,
            base,
            Arc::clone(&registry),
            clock.clone(),
        );
        registrar.add_controller(controller);
        Fixture {
            registrar,
            registry,
            clock,
            controller,
        }
    }

    #[test]
    fn register_points_registry_at_owner() {
        let fx = setup();
        let label = LabelHash::new("vitalik");
        let owner = Address::derive("vitalik");

        let expiry = fx.registrar.register(label, owner, 84_600, fx.controller).unwrap();
        assert_eq!(expiry, 1_000 + 84_600);
        assert_eq!(fx.registrar.owner_of(label).unwrap(), owner);
        assert_eq!(
            fx.registry.owner(fx.registrar.base_node().child(label)),
            owner
        );
        assert!(!fx.registrar.available(label));
    }

    #[test]
    fn register_is_controller_only() {
        let fx = setup();
        let stranger = Address::derive("stranger");
        assert_matches!(
            fx.registrar
                .register(LabelHash::new("x"), stranger, 100, stranger),
            Err(RegistrarError::NotController { .. })
        );
    }

    #[test]
    fn expired_allocations_free_the_label() {
        let fx = setup();
        let label = LabelHash::new("brief");
        let owner = Address::derive("brief-owner");
        fx.registrar.register(label, owner, 50, fx.controller).unwrap();

        fx.clock.0.store(1_051, Ordering::SeqCst);
        assert!(fx.registrar.available(label));
        assert_matches!(
            fx.registrar.owner_of(label),
            Err(RegistrarError::NoAllocation { .. })
        );
        assert_matches!(
            fx.registrar.transfer_from(owner, fx.controller, label, owner),
            Err(RegistrarError::NoAllocation { .. })
        );
    }

    #[test]
    fn huge_durations_saturate_instead_of_overflowing() {
        let fx = setup();
        let label = LabelHash::new("forever");
        let owner = Address::derive("patient");

        let expiry = fx
            .registrar
            .register(label, owner, u64::MAX, fx.controller)
            .unwrap();
        assert_eq!(expiry, u64::MAX);
        assert!(!fx.registrar.available(label));
        assert_eq!(fx.registrar.owner_of(label).unwrap(), owner);
    }

    #[test]
    fn transfer_requires_owner_or_operator() {
        let fx = setup();
        let label = LabelHash::new("token");
        let owner = Address::derive("holder");
        let other = Address::derive("other");
        fx.registrar.register(label, owner, 1_000, fx.controller).unwrap();

        assert_matches!(
            fx.registrar.transfer_from(owner, other, label, other),
            Err(RegistrarError::NotAuthorized { .. })
        );
        assert_matches!(
            fx.registrar.transfer_from(other, owner, label, other),
            Err(RegistrarError::WrongOwner { .. })
        );

        fx.registrar.set_approval_for_all(owner, other, true);
        fx.registrar.transfer_from(owner, other, label, other).unwrap();
        assert_eq!(fx.registrar.owner_of(label).unwrap(), other);
    }

    struct RejectingReceiver;

    impl LeafReceiver for RejectingReceiver {
        fn on_leaf_received(
            &self,
            _operator: Address,
            _from: Address,
            _label: LabelHash,
            _data: &[u8],
        ) -> Result<(), RegistrarError> {
            Err(RegistrarError::ReceiverRejected {
                reason: "not accepting leaves".into(),
            })
        }
    }

    #[test]
    fn safe_transfer_unwinds_when_receiver_rejects() {
        let fx = setup();
        let label = LabelHash::new("bounced");
        let owner = Address::derive("sender");
        let picky = Address::derive("picky");
        fx.registrar.register(label, owner, 1_000, fx.controller).unwrap();
        fx.registrar.register_receiver(picky, Arc::new(RejectingReceiver));

        assert_matches!(
            fx.registrar.safe_transfer_from(owner, picky, label, &[], owner),
            Err(RegistrarError::ReceiverRejected { .. })
        );
        assert_eq!(fx.registrar.owner_of(label).unwrap(), owner);
    }

    #[test]
    fn safe_transfer_without_receiver_behaves_like_transfer() {
        let fx = setup();
        let label = LabelHash::new("plain");
        let owner = Address::derive("sender");
        let dest = Address::derive("dest");
        fx.registrar.register(label, owner, 1_000, fx.controller).unwrap();

        fx.registrar.safe_transfer_from(owner, dest, label, &[], owner).unwrap();
        assert_eq!(fx.registrar.owner_of(label).unwrap(), dest);
    }
}
