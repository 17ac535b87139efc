//! Error types for the collaborator seams
//!
//! Collaborator rejections that cross into the wrapper core are folded into
//! [`WrapError::ExternalCallFailed`] with the collaborator's reject reason
//! carried verbatim.

use namewrap_core::{Address, LabelHash, Node, WrapError};
use serde::{Deserialize, Serialize};

/// Rejections from the name registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RegistryError {
    /// Caller may not mutate the node.
    #[error("registry: {caller} is not authorized for {node}")]
    NotAuthorized {
        /// The rejected caller
        caller: Address,
        /// The node acted on
        node: Node,
    },
}

/// Rejections from the leaf allocation registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RegistrarError {
    /// Caller is not a registered controller.
    #[error("registrar: {caller} is not a controller")]
    NotController {
        /// The rejected caller
        caller: Address,
    },

    /// The label is currently allocated.
    #[error("registrar: label {label} is not available")]
    NotAvailable {
        /// The contested label
        label: LabelHash,
    },

    /// No live allocation exists for the label.
    #[error("registrar: no live allocation for label {label}")]
    NoAllocation {
        /// The unknown or expired label
        label: LabelHash,
    },

    /// Caller is neither the allocation owner nor an approved operator.
    #[error("registrar: {caller} is not authorized for label {label}")]
    NotAuthorized {
        /// The rejected caller
        caller: Address,
        /// The label acted on
        label: LabelHash,
    },

    /// `from` does not match the allocation's current owner.
    #[error("registrar: label {label} is owned by {actual}, not {claimed}")]
    WrongOwner {
        /// The label acted on
        label: LabelHash,
        /// The owner asserted by the caller
        claimed: Address,
        /// The actual allocation owner
        actual: Address,
    },

    /// The recipient's acceptance hook rejected the transfer.
    #[error("registrar: receiver rejected transfer: {reason}")]
    ReceiverRejected {
        /// The receiver's reject reason
        reason: String,
    },

    /// A registry write made on the allocation's behalf was rejected.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Rejections from a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ResolverError {
    /// The resolver refused the forwarded payload.
    #[error("resolver rejected call for {node}: {reason}")]
    Rejected {
        /// The target node
        node: Node,
        /// The resolver's reject reason
        reason: String,
    },
}

impl From<RegistryError> for WrapError {
    fn from(err: RegistryError) -> Self {
        WrapError::external(err.to_string())
    }
}

impl From<RegistrarError> for WrapError {
    fn from(err: RegistrarError) -> Self {
        WrapError::external(err.to_string())
    }
}

impl From<ResolverError> for WrapError {
    fn from(err: ResolverError) -> Self {
        WrapError::external(err.to_string())
    }
}
