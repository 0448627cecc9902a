//! `satisfies_dirty`: the "dirty read" check used by writers probing for a
//! conflicting concurrent transaction before blocking on it. Unlike
//! `satisfies_mvcc`, a producer that is merely in progress is treated as
//! visible, and narrows the caller's own snapshot to record which xid it
//! observed — the caller then waits on that xid rather than re-scanning.

use crate::context::VisibilityContext;
use crate::error::VisibilityError;
use crate::state::{self, Resolved, TupleState};
use crate::walker;
use common::ids::Xid;
use concurrency::snapshot::Snapshot;
use storage::tuple::Tuple;
use tracing::{debug, instrument};

/// The bucket this predicate classifies a producer into. Distinct from
/// [`state::XactBucket`]: a dirty read has no use for "in the caller's
/// snapshot" (it wants definite in-progress/committed/aborted, not a
/// point-in-time snapshot membership test), but it does need to separate
/// the caller's own xid from everyone else's in-progress work, since the
/// caller's own delete/update is never reported back to it as a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirtyBucket {
    CurrentXact,
    OtherInProgress,
    Committed,
    Aborted,
}

fn bucket(ctx: &VisibilityContext, xid: Xid, reader: Xid) -> DirtyBucket {
    if ctx.oracle.is_current(xid, reader) {
        DirtyBucket::CurrentXact
    } else if ctx.oracle.is_in_progress(xid) {
        DirtyBucket::OtherInProgress
    } else if ctx.oracle.did_commit(xid) {
        DirtyBucket::Committed
    } else {
        DirtyBucket::Aborted
    }
}

#[instrument(skip(ctx, tuple, snapshot), fields(tid = ?tuple.header().self_tid(), reader = ?reader))]
pub fn satisfies_dirty(
    ctx: &VisibilityContext,
    tuple: &Tuple,
    snapshot: &mut Snapshot,
    reader: Xid,
) -> Result<Option<Tuple>, VisibilityError> {
    let resolved = state::resolve(ctx, tuple.header())?;
    let result = decide(ctx, tuple, resolved, snapshot, reader, None);
    debug!(visible = result.as_ref().map(|r| r.is_some()).unwrap_or(false), "dirty-read verdict");
    result
}

fn frozen_result(tuple: &Tuple) -> Option<Tuple> {
    if tuple.header().flags().is_deleted_or_updated() {
        None
    } else {
        Some(tuple.clone())
    }
}

fn decide(
    ctx: &VisibilityContext,
    tuple: &Tuple,
    resolved: Resolved,
    snapshot: &mut Snapshot,
    reader: Xid,
    prev_undo_xid: Option<Xid>,
) -> Result<Option<Tuple>, VisibilityError> {
    let (xid, _cid, urec_ptr) = match resolved {
        Resolved::Frozen => return Ok(frozen_result(tuple)),
        Resolved::Active { xid, cid, urec_ptr } => (xid, cid, urec_ptr),
    };

    if ctx.precedes_horizon(xid) {
        return Ok(frozen_result(tuple));
    }

    let flags = tuple.header().flags();
    let producer_bucket = bucket(ctx, xid, reader);

    match state::classify(flags) {
        TupleState::DeletedOrUpdated => match producer_bucket {
            DirtyBucket::CurrentXact => Ok(None),
            DirtyBucket::OtherInProgress => {
                snapshot.set_xmax(xid);
                Ok(Some(tuple.clone()))
            }
            DirtyBucket::Committed => Ok(None),
            // FIXME: the aborted-producer case for deletes/updates is left
            // unhandled upstream; the safe default is to report nothing
            // rather than guess at a version that may never materialize.
            DirtyBucket::Aborted => {
                debug!(xid = ?xid, "aborted deleting producer, defaulting to not visible");
                Ok(None)
            }
        },
        TupleState::InplaceOrLockOnly => match producer_bucket {
            DirtyBucket::CurrentXact => {
                if flags.is_lock_only() || _cid < snapshot.curcid() {
                    Ok(Some(tuple.clone()))
                } else {
                    walk_and_recurse(ctx, tuple, urec_ptr, prev_undo_xid, snapshot, reader)
                }
            }
            DirtyBucket::OtherInProgress => {
                if !flags.is_lock_only() {
                    snapshot.set_xmax(xid);
                }
                Ok(Some(tuple.clone()))
            }
            DirtyBucket::Committed => Ok(Some(tuple.clone())),
            DirtyBucket::Aborted => {
                walk_and_recurse(ctx, tuple, urec_ptr, prev_undo_xid, snapshot, reader)
            }
        },
        TupleState::Other => match producer_bucket {
            DirtyBucket::CurrentXact => {
                if _cid < snapshot.curcid() {
                    Ok(Some(tuple.clone()))
                } else {
                    Ok(None)
                }
            }
            DirtyBucket::OtherInProgress => {
                snapshot.set_xmin(xid);
                Ok(Some(tuple.clone()))
            }
            DirtyBucket::Committed => Ok(Some(tuple.clone())),
            DirtyBucket::Aborted => Ok(None),
        },
    }
}

fn walk_and_recurse(
    ctx: &VisibilityContext,
    tuple: &Tuple,
    urec_ptr: common::ids::UndoPtr,
    prev_undo_xid: Option<Xid>,
    snapshot: &mut Snapshot,
    reader: Xid,
) -> Result<Option<Tuple>, VisibilityError> {
    match walker::walk(ctx, tuple, urec_ptr, prev_undo_xid)? {
        None => Ok(Some(tuple.clone())),
        Some(step) => {
            let resolved = state::resolved_after_step(ctx, tuple, &step);
            decide(
                ctx,
                &step.prior_tuple,
                resolved,
                snapshot,
                reader,
                Some(step.prior_xid),
            )
        }
    }
}
