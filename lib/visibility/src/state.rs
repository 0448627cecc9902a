//! Shared classification helpers (component C4, plus the xid-bucketing
//! used by every predicate). Nothing here decides visibility by itself;
//! each predicate combines these buckets into its own decision table.

use crate::context::VisibilityContext;
use crate::error::VisibilityError;
use crate::resolver;
use crate::walker::{self, ChainStep};
use common::ids::{CommandId, Xid};
use common::UndoPtr;
use concurrency::snapshot::Snapshot;
use storage::tuple::{Tuple, TransactionSlot, TupleFlags, TupleHeader};
use tracing::{debug, error, instrument};

/// The decoded result of reading a tuple header's transaction-slot
/// reference (component C4): either the page-wide frozen sentinel, or the
/// concrete producer xid/cid/undo-pointer triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Frozen,
    Active {
        xid: Xid,
        cid: CommandId,
        urec_ptr: UndoPtr,
    },
}

/// Decodes a tuple header's producer, recovering it from undo when the
/// embedded slot index has been recycled.
#[instrument(skip(ctx, header), fields(tid = ?header.self_tid()))]
pub fn resolve(ctx: &VisibilityContext, header: &TupleHeader) -> Result<Resolved, VisibilityError> {
    if !header.flags().is_well_formed() {
        error!(tid = ?header.self_tid(), flags = ?header.flags(), "tuple header sets more than one exclusive flag");
        return Err(VisibilityError::MalformedFlags(header.self_tid()));
    }

    match header.slot() {
        TransactionSlot::Frozen => Ok(Resolved::Frozen),
        TransactionSlot::Index(index) => {
            if header.flags().has_invalid_slot() {
                debug!(tid = ?header.self_tid(), index, "slot marked invalid, recovering producer from undo");
                let (xid, cid, urec_ptr) = resolver::resolve_xact_info(ctx, header, index)?;
                Ok(Resolved::Active { xid, cid, urec_ptr })
            } else {
                let entry = ctx.page.slot(header.self_tid().page_id(), index).ok_or_else(|| {
                    error!(tid = ?header.self_tid(), index, "page metadata has no such slot");
                    VisibilityError::UnresolvableSlot(header.self_tid())
                })?;
                Ok(Resolved::Active {
                    xid: entry.xid,
                    cid: entry.cid,
                    urec_ptr: entry.undo_ptr,
                })
            }
        }
    }
}

/// The three-way split most predicates build their decision table from, by
/// which mutually-exclusive operation flag (if any) is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleState {
    DeletedOrUpdated,
    InplaceOrLockOnly,
    Other,
}

pub fn classify(flags: TupleFlags) -> TupleState {
    if flags.is_deleted_or_updated() {
        TupleState::DeletedOrUpdated
    } else if flags.is_inplace_updated_or_lock_only() {
        TupleState::InplaceOrLockOnly
    } else {
        TupleState::Other
    }
}

/// The finer three-way split the oldest-xmin predicate needs, which treats
/// lock-only separately from a genuine in-place update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OldestXminState {
    DeletedOrUpdated,
    LockOnly,
    InsertOrInplaceUpdated,
}

pub fn classify_for_oldest_xmin(flags: TupleFlags) -> OldestXminState {
    if flags.is_deleted_or_updated() {
        OldestXminState::DeletedOrUpdated
    } else if flags.is_lock_only() {
        OldestXminState::LockOnly
    } else {
        OldestXminState::InsertOrInplaceUpdated
    }
}

/// The producer-xid bucket shared by the MVCC and update predicates: did
/// `xid` produce this version as part of the read's own transaction, a
/// concurrent transaction visible in its snapshot, a committed transaction
/// outside the snapshot, or an aborted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XactBucket {
    Current,
    InSnapshot,
    Committed,
    Aborted,
}

pub fn bucket_via_snapshot(
    ctx: &VisibilityContext,
    xid: Xid,
    reader: Xid,
    snapshot: &Snapshot,
) -> XactBucket {
    if ctx.oracle.is_current(xid, reader) {
        XactBucket::Current
    } else if ctx.oracle.in_mvcc_snapshot(xid, snapshot) {
        XactBucket::InSnapshot
    } else if ctx.oracle.did_commit(xid) {
        XactBucket::Committed
    } else {
        XactBucket::Aborted
    }
}

/// The coarser bucket the oldest-xmin predicate uses: it takes no snapshot,
/// so "current" and "in progress" collapse into one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleBucket {
    CurrentOrInProgress,
    Committed,
    Aborted,
}

pub fn bucket_simple(ctx: &VisibilityContext, xid: Xid, reader: Xid) -> SimpleBucket {
    if ctx.oracle.is_current(xid, reader) || ctx.oracle.is_in_progress(xid) {
        SimpleBucket::CurrentOrInProgress
    } else if ctx.oracle.did_commit(xid) {
        SimpleBucket::Committed
    } else {
        SimpleBucket::Aborted
    }
}

/// Resolves what a predicate should treat the tuple produced by `step` as,
/// continuing either along the hop's own `blkprev` or re-rooted against a
/// different slot, per [`walker::next_urec_ptr`]. This is the one place
/// that translates "where does the next walk hop start" into the same
/// `Resolved` shape [`resolve`] produces for a page-read tuple, so
/// predicates can recurse without re-deriving it themselves.
pub fn resolved_after_step(ctx: &VisibilityContext, tuple: &Tuple, step: &ChainStep) -> Resolved {
    match walker::next_urec_ptr(ctx, tuple, step) {
        None => Resolved::Frozen,
        Some(urec_ptr) => Resolved::Active {
            xid: step.prior_xid,
            cid: step.prior_cid,
            urec_ptr,
        },
    }
}
