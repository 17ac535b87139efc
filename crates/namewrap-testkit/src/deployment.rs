//! The standard deployment fixture
//!
//! Builds the full collaborator graph in dependency order (registry, then
//! registrar, then wrapper), with deterministic identities so assertions can
//! name any participant by tag.

use namewrap_core::{Address, LabelHash, Node};
use namewrap_registry::{
    InMemoryRegistrar, InMemoryRegistry, InMemoryResolver, SharedRegistrar, SharedRegistry,
    SharedResolver,
};
use namewrap_wrapper::NameWrapper;
use std::sync::Arc;
use tracing::debug;

use crate::clock::TestClock;

/// Registration duration used by fixtures unless a test chooses its own.
pub const DEFAULT_DURATION: u64 = 84_600;

/// A fully wired registry + registrar + resolver + wrapper deployment.
pub struct Deployment {
    /// The bootstrap identity: registry root owner and registrar controller.
    pub deployer: Address,
    /// The authoritative registry.
    pub registry: SharedRegistry,
    /// The leaf allocation registrar.
    pub registrar: SharedRegistrar,
    /// The pass-through resolver.
    pub resolver: SharedResolver,
    /// The wrapper under test.
    pub wrapper: Arc<NameWrapper>,
    /// Deterministic clock driving allocation expiry.
    pub clock: Arc<TestClock>,
    /// The leaf TLD label.
    pub leaf_label: LabelHash,
    /// The leaf TLD node.
    pub leaf_node: Node,
}

impl Deployment {
    /// Deploy everything under a leaf TLD named `leaf_label`, wire the
    /// standard approvals, and return the fixture.
    pub fn bootstrap(leaf_label: &str) -> Self {
        crate::init_tracing();

        let deployer = Address::derive("deployer");
        let registrar_addr = Address::derive("registrar");
        let wrapper_addr = Address::derive("wrapper");
        let clock = Arc::new(TestClock::new(1_700_000_000));

        let registry: SharedRegistry = Arc::new(InMemoryRegistry::new(deployer));

        // Seed the leaf TLD and hand it to the registrar.
        let label = LabelHash::new(leaf_label);
        let leaf_node = registry
            .set_subnode_owner(Node::ROOT, label, registrar_addr, deployer)
            .expect("deployer owns the root");

        let registrar: SharedRegistrar = Arc::new(InMemoryRegistrar::new(
            registrar_addr,
            leaf_node,
            Arc::clone(&registry),
            clock.clone(),
        ));
        registrar.add_controller(deployer);

        let resolver: SharedResolver = Arc::new(InMemoryResolver::new());

        let wrapper = Arc::new(NameWrapper::new(
            wrapper_addr,
            leaf_node,
            Arc::clone(&registry),
            Arc::clone(&registrar),
            Arc::clone(&resolver),
        ));
        registrar.register_receiver(wrapper_addr, wrapper.clone());

        debug!(%leaf_node, "deployment bootstrapped");
        Self {
            deployer,
            registry,
            registrar,
            resolver,
            wrapper,
            clock,
            leaf_label: label,
            leaf_node,
        }
    }

    /// A deterministic account that has pre-approved the wrapper in both the
    /// registry and the registrar, as any participant must before wrapping.
    pub fn funded_account(&self, tag: &str) -> Address {
        let account = Address::derive(tag);
        self.registry
            .set_approval_for_all(account, self.wrapper.address(), true);
        self.registrar
            .set_approval_for_all(account, self.wrapper.address(), true);
        account
    }

    /// A deterministic account with no approvals wired.
    pub fn bare_account(&self, tag: &str) -> Address {
        Address::derive(tag)
    }

    /// Register a leaf allocation for `owner` and return its label hash.
    pub fn register_leaf(&self, label: &str, owner: Address, duration: u64) -> LabelHash {
        let label = LabelHash::new(label);
        self.registrar
            .register(label, owner, duration, self.deployer)
            .expect("deployer is a controller");
        label
    }

    /// The node for a leaf label.
    pub fn leaf_child(&self, label: &str) -> Node {
        self.leaf_node.child(LabelHash::new(label))
    }
}
