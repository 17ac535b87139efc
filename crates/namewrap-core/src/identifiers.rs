//! Core identifier types for the hierarchical name tree
//!
//! Three identities exist in the system: an [`Address`] names an account or a
//! deployed component, a [`LabelHash`] names one segment of a name, and a
//! [`Node`] names a position in the tree. Node identities are minted only by
//! derivation from a parent node and a label hash.

use crate::hash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An account or component identity.
///
/// Opaque 20-byte value. The all-zero address is the distinguished
/// "no owner" value and is never a valid operation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The distinguished "no owner" address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Derive a stable address from a tag.
    ///
    /// First 20 bytes of the central hash of the tag. Intended for fixtures
    /// and bootstrap wiring, where identities must be reproducible.
    pub fn derive(tag: &str) -> Self {
        let digest = hash::hash(tag.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }

    /// Whether this is the "no owner" address.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(s)?;
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(bytes))
    }
}

/// The hash of a single name segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelHash(pub [u8; 32]);

impl LabelHash {
    /// Hash a label string (e.g. `"leaf"`, `"wrapped"`).
    pub fn new(label: &str) -> Self {
        Self(hash::hash(label.as_bytes()))
    }
}

impl fmt::Display for LabelHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A position in the hierarchical name tree.
///
/// The root is the all-zero node; all other nodes are derived through
/// [`Node::child`]. Two implementations agree on a node identity exactly when
/// they agree on the derivation path from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node(pub [u8; 32]);

impl Node {
    /// The root of the name tree.
    pub const ROOT: Node = Node([0u8; 32]);

    /// Derive the child node identity for a label under this node.
    pub fn child(&self, label: LabelHash) -> Node {
        Node(hash::hash_pair(&self.0, &label.0))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Compute the node for a dotted name, folding labels right-to-left from the
/// root (`namehash("a.b") == ROOT.child(hash("b")).child(hash("a"))`).
///
/// The empty string names the root.
pub fn namehash(name: &str) -> Node {
    if name.is_empty() {
        return Node::ROOT;
    }
    name.rsplit('.')
        .fold(Node::ROOT, |node, label| node.child(LabelHash::new(label)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_zero() {
        assert_eq!(Node::ROOT.0, [0u8; 32]);
        assert_eq!(namehash(""), Node::ROOT);
    }

    #[test]
    fn namehash_matches_manual_derivation() {
        let leaf = Node::ROOT.child(LabelHash::new("leaf"));
        let wrapped = leaf.child(LabelHash::new("wrapped"));
        assert_eq!(namehash("leaf"), leaf);
        assert_eq!(namehash("wrapped.leaf"), wrapped);
        assert_ne!(wrapped, leaf);
    }

    #[test]
    fn sibling_labels_do_not_collide() {
        assert_ne!(namehash("a.leaf"), namehash("b.leaf"));
        // Same label under different parents is a different node.
        assert_ne!(namehash("a.leaf"), namehash("a.other"));
    }

    #[test]
    fn address_display_round_trips() {
        let addr = Address::derive("alice");
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);
        assert!(!addr.is_zero());
        assert!(Address::ZERO.is_zero());
    }
}
