#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;
use std::fmt;

/// A transaction identifier.
///
/// Ordering between two `Xid`s is wraparound-aware: comparisons go through
/// [`Xid::precedes`] rather than the derived `Ord`, since a producer's xid
/// counter is expected to wrap after `u32::MAX` transactions in a long-lived
/// system. The derived `Ord`/`PartialOrd` below are kept only for use as a
/// `BTreeMap`/`HashMap` key and must not be used to decide visibility.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Shrinkwrap,
)]
pub struct Xid(pub u32);

impl Xid {
    /// The bootstrap/invalid transaction id. No real transaction ever uses it.
    pub const INVALID: Xid = Xid(0);

    pub fn new(xid: u32) -> Self {
        Self(xid)
    }

    pub fn is_valid(&self) -> bool {
        *self != Xid::INVALID
    }

    /// Wraparound-aware "happens before": true when `self` is strictly older
    /// than `other` in transaction-id space.
    pub fn precedes(&self, other: &Xid) -> bool {
        (self.0.wrapping_sub(other.0) as i32) < 0
    }

    pub fn precedes_or_eq(&self, other: &Xid) -> bool {
        self == other || self.precedes(other)
    }

    pub fn next(&self) -> Xid {
        Xid(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Xid({})", self.0)
    }
}

impl From<u32> for Xid {
    fn from(xid: u32) -> Self {
        Self(xid)
    }
}

/// A command id: the ordinal of a statement within its owning transaction.
/// Used to decide self-visibility across commands of the same transaction.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Shrinkwrap,
)]
pub struct CommandId(pub u32);

impl CommandId {
    pub fn new(cid: u32) -> Self {
        Self(cid)
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandId({})", self.0)
    }
}

impl From<u32> for CommandId {
    fn from(cid: u32) -> Self {
        Self(cid)
    }
}

/// A byte offset into the undo log, opaque to everything except the undo
/// store that resolves it into a record.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Shrinkwrap,
)]
pub struct UndoPtr(pub u64);

impl UndoPtr {
    pub fn new(offset: u64) -> Self {
        Self(offset)
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for UndoPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UndoPtr({})", self.0)
    }
}

impl From<u64> for UndoPtr {
    fn from(offset: u64) -> Self {
        Self(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xid_precedes_handles_the_common_case() {
        let older = Xid::new(100);
        let newer = Xid::new(101);
        assert!(older.precedes(&newer));
        assert!(!newer.precedes(&older));
        assert!(!older.precedes(&older));
    }

    #[test]
    fn xid_precedes_handles_wraparound() {
        let near_max = Xid::new(u32::MAX);
        let wrapped = Xid::new(1);
        assert!(near_max.precedes(&wrapped));
        assert!(!wrapped.precedes(&near_max));
    }

    #[test]
    fn invalid_xid_is_not_valid() {
        assert!(!Xid::INVALID.is_valid());
        assert!(Xid::new(1).is_valid());
    }

    #[test]
    fn undo_ptr_null_check() {
        assert!(UndoPtr::new(0).is_null());
        assert!(!UndoPtr::new(1).is_null());
    }
}
