//! The on-page tuple header and the flags that describe what happened to a
//! tuple version most recently, without needing to consult undo for the
//! common case.

#![allow(dead_code)]

use bitflags::bitflags;
use common::tid::Tid;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use tracing::warn;
use typed_builder::TypedBuilder;

bitflags! {
    /// Flags carried directly in a tuple header. At most one of `DELETED`,
    /// `UPDATED`, `INPLACE_UPDATED`, and `XID_LOCK_ONLY` is ever set for a
    /// given version: together they describe the single most-recent
    /// operation recorded against its transaction slot. `INVALID_XACT_SLOT`
    /// is orthogonal to all four and marks that the slot index embedded in
    /// the header has since been recycled for another transaction, forcing
    /// the reader to recover the real producer from undo.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TupleFlags: u8 {
        const DELETED            = 0b0000_0001;
        const UPDATED             = 0b0000_0010;
        const INPLACE_UPDATED     = 0b0000_0100;
        const XID_LOCK_ONLY       = 0b0000_1000;
        const INVALID_XACT_SLOT   = 0b0001_0000;
    }
}

impl TupleFlags {
    const EXCLUSIVE: TupleFlags = TupleFlags::DELETED
        .union(TupleFlags::UPDATED)
        .union(TupleFlags::INPLACE_UPDATED)
        .union(TupleFlags::XID_LOCK_ONLY);

    /// True if at most one of the mutually-exclusive operation flags is set.
    /// A corrupt header that violates this should be treated as storage
    /// corruption by the caller, not silently tolerated.
    pub fn is_well_formed(&self) -> bool {
        let well_formed = (*self & Self::EXCLUSIVE).bits().count_ones() <= 1;
        if !well_formed {
            warn!(flags = ?self, "tuple flags set more than one exclusive bit");
        }
        well_formed
    }

    pub fn is_deleted_or_updated(&self) -> bool {
        self.intersects(TupleFlags::DELETED | TupleFlags::UPDATED)
    }

    pub fn is_inplace_updated_or_lock_only(&self) -> bool {
        self.intersects(TupleFlags::INPLACE_UPDATED | TupleFlags::XID_LOCK_ONLY)
    }

    pub fn is_lock_only(&self) -> bool {
        self.contains(TupleFlags::XID_LOCK_ONLY)
    }

    pub fn has_invalid_slot(&self) -> bool {
        self.contains(TupleFlags::INVALID_XACT_SLOT)
    }
}

/// A tuple's reference to the per-page array of recent-transaction slots.
/// Replaces the sentinel integer a byte-for-byte header would use: `Frozen`
/// is the explicit state for "this page's transaction bookkeeping has been
/// reclaimed, every version on it predates any retained undo," and
/// `Index` names a live slot to look up in [`crate::page::PageMetadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionSlot {
    Frozen,
    Index(u8),
}

/// Per-tuple metadata read directly off the page, without touching undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, CopyGetters, TypedBuilder)]
pub struct TupleHeader {
    #[getset(get_copy = "pub")]
    self_tid: Tid,
    #[getset(get_copy = "pub")]
    flags: TupleFlags,
    #[getset(get_copy = "pub")]
    slot: TransactionSlot,
}

impl TupleHeader {
    pub fn new(self_tid: Tid, flags: TupleFlags, slot: TransactionSlot) -> Self {
        Self {
            self_tid,
            flags,
            slot,
        }
    }
}

/// A tuple version as read off a page (or reconstructed from an undo
/// record's tuple image). The payload is opaque to the visibility engine;
/// only the header is ever inspected.
#[derive(Debug, Clone, PartialEq, Eq, Getters, TypedBuilder)]
#[getset(get = "pub")]
pub struct Tuple {
    header: TupleHeader,
    data: Vec<u8>,
}

impl Tuple {
    pub fn new(header: TupleHeader, data: Vec<u8>) -> Self {
        Self { header, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_flags_reject_two_set_at_once() {
        let flags = TupleFlags::DELETED | TupleFlags::UPDATED;
        assert!(!flags.is_well_formed());
    }

    #[test]
    fn invalid_slot_flag_does_not_conflict_with_exclusive_flags() {
        let flags = TupleFlags::DELETED | TupleFlags::INVALID_XACT_SLOT;
        assert!(flags.is_well_formed());
        assert!(flags.is_deleted_or_updated());
        assert!(flags.has_invalid_slot());
    }

    #[test]
    fn lock_only_is_in_the_inplace_bucket() {
        let flags = TupleFlags::XID_LOCK_ONLY;
        assert!(flags.is_inplace_updated_or_lock_only());
        assert!(flags.is_lock_only());
        assert!(!flags.is_deleted_or_updated());
    }
}
