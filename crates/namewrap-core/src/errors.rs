//! Unified error taxonomy for wrapper operations
//!
//! Every failure aborts the whole operation with no partial state change; the
//! `Display` string is the verbatim reject reason surfaced to the caller.

use crate::{Address, Fuses, Node};
use serde::{Deserialize, Serialize};

/// Rejection reasons for wrapper operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum WrapError {
    /// Caller is neither the owner nor an approved delegate.
    #[error("unauthorized: {caller} may not act on {node}")]
    Unauthorized {
        /// The rejected caller
        caller: Address,
        /// The node acted on
        node: Node,
    },

    /// The requested mutation is permanently blocked by a burned fuse.
    #[error("fuse {fuse} has been burned for {node}")]
    FuseBurned {
        /// The gate bit that is burned
        fuse: Fuses,
        /// The node whose record carries the burned fuse
        node: Node,
    },

    /// The operation requires an existing wrapped record.
    #[error("{node} is not wrapped")]
    NotWrapped {
        /// The node without a record
        node: Node,
    },

    /// A wrapped record already exists for the node.
    #[error("{node} is already wrapped")]
    AlreadyWrapped {
        /// The node with an existing record
        node: Node,
    },

    /// The derived child node does not match the asserted parent/label pair.
    #[error("{node} is not derived from {parent}")]
    InvalidParent {
        /// The asserted parent
        parent: Node,
        /// The mismatching node
        node: Node,
    },

    /// A collaborator rejected the forwarded call.
    #[error("external call failed: {reason}")]
    ExternalCallFailed {
        /// The collaborator's reject reason, verbatim
        reason: String,
    },
}

impl WrapError {
    /// An unauthorized-caller rejection.
    pub fn unauthorized(caller: Address, node: Node) -> Self {
        Self::Unauthorized { caller, node }
    }

    /// A burned-fuse rejection for one named gate bit.
    pub fn fuse_burned(fuse: Fuses, node: Node) -> Self {
        Self::FuseBurned { fuse, node }
    }

    /// A collaborator rejection, carried verbatim.
    pub fn external(reason: impl Into<String>) -> Self {
        Self::ExternalCallFailed {
            reason: reason.into(),
        }
    }
}

/// Standard result type for wrapper operations.
pub type Result<T> = std::result::Result<T, WrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_the_gate_bit() {
        let node = Node::ROOT.child(crate::LabelHash::new("leaf"));
        let err = WrapError::fuse_burned(Fuses::CANNOT_SET_DATA, node);
        assert!(err.to_string().contains("CANNOT_SET_DATA"));
    }
}
