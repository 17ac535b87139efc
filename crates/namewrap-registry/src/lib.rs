//! Namewrap Registry - Collaborator Seams
//!
//! The wrapper core never stores the name tree itself; it drives three
//! external collaborators through narrow trait seams defined here:
//!
//! - [`NameRegistry`]: the authoritative parent-to-child ownership mapping
//! - [`LeafRegistrar`]: the allocation authority issuing time-bounded
//!   ownership of top-level leaf labels
//! - [`Resolver`]: an opaque record store, driven by pass-through calls
//!
//! Each seam ships with an in-memory reference implementation used by the
//! bootstrap fixture and the test suites. The reference implementations use
//! interior mutability (`&self` methods over an internal lock) so they can be
//! shared as plain `Arc<dyn …>` trait objects; every method releases the
//! internal lock before calling out through another seam.

#![forbid(unsafe_code)]

/// Deterministic time seam for allocation expiry
pub mod clock;

/// Collaborator error types
pub mod errors;

/// Leaf allocation registrar seam and reference implementation
pub mod registrar;

/// Name registry seam and reference implementation
pub mod registry;

/// Opaque resolver seam and reference implementation
pub mod resolver;

pub use clock::{Clock, SharedClock, SystemClock};
pub use errors::{RegistrarError, RegistryError, ResolverError};
pub use registrar::{InMemoryRegistrar, LeafReceiver, LeafRegistrar, SharedRegistrar};
pub use registry::{InMemoryRegistry, NameRegistry, SharedRegistry};
pub use resolver::{InMemoryResolver, Resolver, ResolverCall, SharedResolver};
