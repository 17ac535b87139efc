//! Centralized synchronous hashing for identity derivation
//!
//! Hashing here is pure and deterministic, so it lives outside any effect or
//! collaborator seam. This module is the single source of truth for which
//! algorithm derives node and label identities: change the algorithm here and
//! every call site follows without modification.
//!
//! Current algorithm: **SHA-256** (32-byte output).

use sha2::{Digest, Sha256};

/// Hash arbitrary bytes to a 32-byte digest.
pub fn hash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash the concatenation of two 32-byte values.
///
/// Used for child-node derivation (`parent ‖ labelhash`); kept as a dedicated
/// entry point so the derivation encoding has exactly one definition.
pub fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash(b"leaf"), hash(b"leaf"));
        assert_ne!(hash(b"leaf"), hash(b"Leaf"));
    }

    #[test]
    fn hash_pair_matches_concatenation() {
        let a = hash(b"a");
        let b = hash(b"b");
        let mut joined = Vec::with_capacity(64);
        joined.extend_from_slice(&a);
        joined.extend_from_slice(&b);
        assert_eq!(hash_pair(&a, &b), hash(&joined));
    }

    #[test]
    fn hash_pair_is_order_sensitive() {
        let a = hash(b"a");
        let b = hash(b"b");
        assert_ne!(hash_pair(&a, &b), hash_pair(&b, &a));
    }
}
