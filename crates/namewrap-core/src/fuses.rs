//! The fuse bitset: monotonic, irrevocable permission restrictions
//!
//! Each named bit means "the corresponding capability is permanently revoked
//! for this node". Burning is a pure bitwise OR: bits can be added, never
//! cleared, so for any sequence of burns the bitset only grows. The all-zero
//! value is the unrestricted state.
//!
//! Bits outside the named vocabulary are reserved. They are carried verbatim
//! through every operation and gate nothing: a gate tests only the named bit
//! it recognizes, so an implementation reading a record written by a newer
//! vocabulary treats the unknown bits as permitted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// A set of burned fuses for one wrapped node.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Fuses(pub u32);

impl Fuses {
    /// No restrictions.
    pub const NONE: Fuses = Fuses(0);

    /// The node can never be unwrapped back to plain registry ownership.
    pub const CANNOT_UNWRAP: Fuses = Fuses(1);

    /// The wrapper ownership token can no longer be transferred.
    pub const CANNOT_TRANSFER: Fuses = Fuses(2);

    /// Resolver and TTL metadata can no longer be changed while wrapped.
    pub const CANNOT_SET_DATA: Fuses = Fuses(4);

    /// New child nodes can no longer be created under this node.
    pub const CANNOT_CREATE_SUBDOMAIN: Fuses = Fuses(8);

    /// Existing child nodes under this node can no longer be reassigned.
    pub const CANNOT_REPLACE_SUBDOMAIN: Fuses = Fuses(16);

    /// All bits in `other` are set in `self`.
    pub fn contains(&self, other: Fuses) -> bool {
        self.0 & other.0 == other.0
    }

    /// Bitwise union. Burning is idempotent and can only add bits; reserved
    /// bits in either operand are preserved.
    pub fn union(&self, other: Fuses) -> Fuses {
        Fuses(self.0 | other.0)
    }

    /// No bits set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Fuses {
    type Output = Fuses;

    fn bitor(self, rhs: Fuses) -> Fuses {
        self.union(rhs)
    }
}

impl fmt::Display for Fuses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let named = [
            (Fuses::CANNOT_UNWRAP, "CANNOT_UNWRAP"),
            (Fuses::CANNOT_TRANSFER, "CANNOT_TRANSFER"),
            (Fuses::CANNOT_SET_DATA, "CANNOT_SET_DATA"),
            (Fuses::CANNOT_CREATE_SUBDOMAIN, "CANNOT_CREATE_SUBDOMAIN"),
            (Fuses::CANNOT_REPLACE_SUBDOMAIN, "CANNOT_REPLACE_SUBDOMAIN"),
        ];
        let mut first = true;
        let mut rest = self.0;
        for (flag, name) in named {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
                rest &= !flag.0;
            }
        }
        if rest != 0 {
            if !first {
                write!(f, "|")?;
            }
            write!(f, "0x{rest:x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn named_flags_are_independent_powers_of_two() {
        let flags = [
            Fuses::CANNOT_UNWRAP,
            Fuses::CANNOT_TRANSFER,
            Fuses::CANNOT_SET_DATA,
            Fuses::CANNOT_CREATE_SUBDOMAIN,
            Fuses::CANNOT_REPLACE_SUBDOMAIN,
        ];
        for (i, a) in flags.iter().enumerate() {
            assert!(a.0.is_power_of_two());
            for b in &flags[i + 1..] {
                assert_eq!(a.0 & b.0, 0);
            }
        }
    }

    #[test]
    fn burn_is_idempotent() {
        let once = Fuses::NONE.union(Fuses::CANNOT_SET_DATA);
        let twice = once.union(Fuses::CANNOT_SET_DATA);
        assert_eq!(once, twice);
    }

    #[test]
    fn reserved_bits_round_trip() {
        let reserved = Fuses(1 << 20);
        let burned = reserved.union(Fuses::CANNOT_UNWRAP);
        assert!(burned.contains(reserved));
        assert!(burned.contains(Fuses::CANNOT_UNWRAP));
        assert!(!burned.contains(Fuses::CANNOT_SET_DATA));
    }

    #[test]
    fn display_names_known_bits() {
        let fuses = Fuses::CANNOT_UNWRAP | Fuses::CANNOT_SET_DATA;
        assert_eq!(fuses.to_string(), "CANNOT_UNWRAP|CANNOT_SET_DATA");
        assert_eq!(Fuses::NONE.to_string(), "none");
    }

    proptest! {
        #[test]
        fn union_is_monotonic(a in any::<u32>(), b in any::<u32>()) {
            let before = Fuses(a);
            let after = before.union(Fuses(b));
            prop_assert!(after.contains(before));
        }

        #[test]
        fn union_never_clears_bits(a in any::<u32>(), b in any::<u32>(), c in any::<u32>()) {
            // Superset property holds across arbitrary burn sequences.
            let s0 = Fuses(a);
            let s1 = s0.union(Fuses(b));
            let s2 = s1.union(Fuses(c));
            prop_assert!(s1.contains(s0));
            prop_assert!(s2.contains(s1));
            prop_assert!(s2.contains(s0));
        }

        #[test]
        fn union_is_commutative_and_associative(a in any::<u32>(), b in any::<u32>(), c in any::<u32>()) {
            prop_assert_eq!(Fuses(a).union(Fuses(b)), Fuses(b).union(Fuses(a)));
            prop_assert_eq!(
                Fuses(a).union(Fuses(b)).union(Fuses(c)),
                Fuses(a).union(Fuses(b).union(Fuses(c)))
            );
        }
    }
}
