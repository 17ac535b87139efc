//! Namewrap Core - Foundation Types
//!
//! This crate provides the foundational value types shared by the namewrap
//! system: identifiers for positions in the hierarchical name tree, the
//! monotonic fuse bitset, and the unified error taxonomy. It contains only
//! pure types and deterministic derivations: no storage, no collaborator
//! calls, no application logic.
//!
//! # Derivation rule
//!
//! A child node identity is *only* valid if derived as
//! `hash(parent_bytes ‖ labelhash_bytes)` through [`Node::child`]; the root
//! node is the distinguished all-zero identifier. Every implementation talking
//! to this system must reproduce the derivation bit-for-bit.

#![forbid(unsafe_code)]

/// Unified error taxonomy for wrapper operations
pub mod errors;

/// Monotonic permission-restriction bitset
pub mod fuses;

/// Centralized synchronous hashing
pub mod hash;

/// Node, label, and address identifiers
pub mod identifiers;

pub use errors::{Result, WrapError};
pub use fuses::Fuses;
pub use identifiers::{namehash, Address, LabelHash, Node};
