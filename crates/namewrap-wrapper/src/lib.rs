//! Namewrap Wrapper - Tokenized Name Ownership with Fuses
//!
//! The wrapper turns direct registry ownership of a node into a tokenized
//! record it manages itself, and layers irrevocable permission restrictions
//! ("fuses") on top. While a node is wrapped, the registry sees the wrapper as
//! the node's owner and the wrapped record says who really controls it; every
//! mutating operation passes a single permission gate that checks caller
//! authorization and the fuse state of the node being acted on (and, for
//! subdomain operations, of the parent).
//!
//! Wrapper state is authoritative only while the wrapper retains registry
//! ownership of the node. Out-of-band registry writes that break that
//! invariant are an accepted, documented risk; the wrapper does not detect or
//! auto-correct them.

#![forbid(unsafe_code)]

/// Approval and delegation state
pub mod approvals;

/// Authorization and fuse gate helpers
mod gate;

/// Wrapped record storage
pub mod records;

/// The wrapper itself and all public operations
pub mod wrapper;

pub use records::WrappedRecord;
pub use wrapper::NameWrapper;
