//! The undo log: the append-only history a tuple's prior versions are
//! recovered from. This module defines the record shape and the storage
//! interface; nothing here decides visibility.

#![allow(dead_code)]

use crate::tuple::{TransactionSlot, TupleFlags};
use common::ids::{CommandId, UndoPtr, Xid};
use common::tid::Tid;
use serde::{Deserialize, Serialize};

/// What kind of operation an undo record reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UndoRecordType {
    Insert,
    Delete,
    /// A non-in-place update: the old version stays at its tid, the new one
    /// lives elsewhere. The record's payload names the successor.
    Update,
    /// An in-place update: old and new content occupy the same tid, the
    /// previous image is carried in the undo record itself.
    InplaceUpdate,
    XidLockOnly,
    /// Written when a tuple's embedded slot index is recycled out from
    /// under a still-reachable version, so the true producer xid/cid can
    /// still be recovered by walking undo.
    InvalidXactSlot,
}

/// The tuple image as it looked immediately before the recorded operation
/// applied, carried by `DELETE`/`UPDATE`/`INPLACE_UPDATE` records so the
/// prior version can be reconstructed without consulting the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleImagePayload {
    pub flags: TupleFlags,
    pub slot: TransactionSlot,
    pub data: Vec<u8>,
}

/// A single undo log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoRecord {
    pub rec_type: UndoRecordType,
    /// The xid that produced the version this record undoes back to.
    pub prev_xid: Xid,
    pub cid: CommandId,
    /// Backward link to the previous record in this page's undo chain.
    pub blkprev: UndoPtr,
    /// Present for `DELETE`, `UPDATE`, and `INPLACE_UPDATE` records.
    pub prior_image: Option<TupleImagePayload>,
    /// Present only for `UPDATE` records: the tid the new version moved to.
    pub successor_tid: Option<Tid>,
}

/// Storage errors surfaced across the page/undo boundary.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("undo record at {0} is corrupt")]
    CorruptRecord(UndoPtr),
    #[error("page metadata requested an unknown slot {0}")]
    UnknownSlot(u8),
}

/// Read access to the undo log (component C2). Every successful
/// [`UndoStore::fetch`] that returns `Some` must be paired with exactly one
/// [`UndoStore::release`] call, on every exit path, including recursive
/// descent through the chain walker.
pub trait UndoStore {
    /// Fetches the record at `ptr`. `prev_undo_xid`, when present, is an
    /// advisory filter: implementations may use it to detect that the
    /// record at `ptr` no longer belongs to the expected producer (because
    /// the chain was switched mid-walk) and fail fast instead of returning
    /// a record from the wrong transaction's history.
    ///
    /// Returns `Ok(None)` when the record has been discarded because its
    /// xid predates the retained undo horizon; this is a normal outcome,
    /// not an error.
    fn fetch(
        &self,
        ptr: UndoPtr,
        prev_undo_xid: Option<Xid>,
    ) -> Result<Option<UndoRecord>, StorageError>;

    /// Releases whatever pin or handle `fetch` acquired for `ptr`. A no-op
    /// for purely in-memory stores, but still called unconditionally so
    /// that implementations backed by a real buffer pool stay correct.
    fn release(&self, ptr: UndoPtr);
}
