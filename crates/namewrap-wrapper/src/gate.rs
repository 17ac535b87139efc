//! The permission gate
//!
//! Every mutating operation funnels through these helpers before touching any
//! state: first who (owner, blanket operator, or per-node delegate), then what
//! (the one fuse bit gating the requested capability). Nodes without a record
//! are treated as having all fuses clear; restrictions apply only while
//! wrapped.
//!
//! Gates test only the named bit they recognize; reserved bits are carried but
//! never interpreted, so a record written by a newer fuse vocabulary fails
//! open here.

use crate::approvals::Approvals;
use crate::records::RecordStore;
use namewrap_core::{Address, Fuses, Node, Result, WrapError};

/// Resolve the wrapped owner of `node`, rejecting callers that are neither
/// the owner, a blanket operator for the owner, nor the node's delegate.
pub(crate) fn require_authorized(
    records: &RecordStore,
    approvals: &Approvals,
    node: Node,
    caller: Address,
) -> Result<Address> {
    let record = records.get(node).ok_or(WrapError::NotWrapped { node })?;
    let owner = record.owner;
    if caller == owner
        || approvals.is_operator(owner, caller)
        || approvals.delegate(node) == Some(caller)
    {
        Ok(owner)
    } else {
        Err(WrapError::unauthorized(caller, node))
    }
}

/// Reject if the named gate bit is burned on `node`. Unwrapped nodes pass.
pub(crate) fn require_fuse_clear(records: &RecordStore, node: Node, gate: Fuses) -> Result<()> {
    if fuses_of(records, node).contains(gate) {
        Err(WrapError::fuse_burned(gate, node))
    } else {
        Ok(())
    }
}

/// The node's fuse state; `Fuses::NONE` while unwrapped.
pub(crate) fn fuses_of(records: &RecordStore, node: Node) -> Fuses {
    records.get(node).map(|r| r.fuses).unwrap_or(Fuses::NONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::WrappedRecord;
    use assert_matches::assert_matches;
    use namewrap_core::namehash;

    fn wrapped(records: &mut RecordStore, name: &str, owner: Address, fuses: Fuses) -> Node {
        let node = namehash(name);
        records.set(node, WrappedRecord { owner, fuses });
        node
    }

    #[test]
    fn owner_operator_and_delegate_pass() {
        let mut records = RecordStore::new();
        let mut approvals = Approvals::new();
        let owner = Address::derive("owner");
        let operator = Address::derive("operator");
        let delegate = Address::derive("delegate");
        let stranger = Address::derive("stranger");
        let node = wrapped(&mut records, "a.leaf", owner, Fuses::NONE);

        approvals.set_operator(owner, operator, true);
        approvals.set_delegate(node, delegate);

        for caller in [owner, operator, delegate] {
            assert_eq!(
                require_authorized(&records, &approvals, node, caller).unwrap(),
                owner
            );
        }
        assert_matches!(
            require_authorized(&records, &approvals, node, stranger),
            Err(WrapError::Unauthorized { .. })
        );
    }

    #[test]
    fn unwrapped_nodes_are_not_wrapped_but_unrestricted() {
        let records = RecordStore::new();
        let approvals = Approvals::new();
        let node = namehash("ghost.leaf");

        assert_matches!(
            require_authorized(&records, &approvals, node, Address::derive("anyone")),
            Err(WrapError::NotWrapped { .. })
        );
        // Fuse reads on unwrapped nodes report no restrictions.
        assert!(require_fuse_clear(&records, node, Fuses::CANNOT_UNWRAP).is_ok());
        assert_eq!(fuses_of(&records, node), Fuses::NONE);
    }

    #[test]
    fn only_the_named_bit_gates() {
        let mut records = RecordStore::new();
        let reserved = Fuses(1 << 17);
        let node = wrapped(
            &mut records,
            "b.leaf",
            Address::derive("owner"),
            Fuses::CANNOT_SET_DATA | reserved,
        );

        assert_matches!(
            require_fuse_clear(&records, node, Fuses::CANNOT_SET_DATA),
            Err(WrapError::FuseBurned { fuse, .. }) if fuse == Fuses::CANNOT_SET_DATA
        );
        // Reserved bits are present in reads but gate nothing named.
        assert!(require_fuse_clear(&records, node, Fuses::CANNOT_UNWRAP).is_ok());
        assert!(fuses_of(&records, node).contains(reserved));
    }
}
