//! Read access to a page's transaction-slot array (component C3). A zheap
//! page keeps a small, fixed-size array of recently-active transaction
//! slots so that most tuples can be classified without consulting undo;
//! this module models just that lookup, not page layout in general.

#![allow(dead_code)]

use common::ids::{CommandId, UndoPtr, Xid};
use common::PageId;
use serde::{Deserialize, Serialize};

/// What a page's transaction slot says about the last writer to use it:
/// the producing xid, the undo pointer to its most recent record on this
/// page, and the command id of the operation that last touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub xid: Xid,
    pub undo_ptr: UndoPtr,
    pub cid: CommandId,
}

/// Read access to a page's transaction-slot array and frozen state
/// (component C3).
pub trait PageMetadata {
    /// Looks up slot `index` on `page`. `None` means the index is out of
    /// range for this page's slot array, which the caller should treat as
    /// storage corruption rather than recurse on.
    fn slot(&self, page: PageId, index: u8) -> Option<SlotEntry>;

    /// True when every tuple on `page` has been frozen: its writers are
    /// known to predate any xid still of interest, so none of its tuples'
    /// headers carry a meaningful `Index` slot any more.
    fn is_frozen(&self, page: PageId) -> bool;
}
