//! Component C6: stepping one undo record back from a tuple version to its
//! immediate predecessor.
//!
//! A single call finds the next record that actually carries a prior tuple
//! image, skipping over content-less records (locks, slot-reuse markers)
//! along the way via `blkprev`. It does not decide where to resume the walk
//! from on the *next* hop — see [`next_urec_ptr`] for that, since whether
//! the next hop continues along `blkprev` or re-roots against a different
//! transaction slot is the single likeliest source of visibility bugs.

use crate::context::VisibilityContext;
use crate::error::VisibilityError;
use common::ids::{CommandId, UndoPtr, Xid};
use storage::tuple::{Tuple, TupleHeader};
use storage::UndoRecordType;
use tracing::{debug, error, instrument};

/// One step back in a tuple's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStep {
    pub prior_tuple: Tuple,
    pub prior_xid: Xid,
    pub prior_cid: CommandId,
    /// The `blkprev` of the record that produced this step, to continue
    /// from on the next hop if the chain is not switched.
    pub next_ptr: UndoPtr,
}

/// Walks back one tuple version from `urec_ptr`. Returns `Ok(None)` when the
/// record (or everything reachable from it without a tuple image) has been
/// discarded because it predates the retained undo horizon — callers treat
/// that the same as "fully committed and visible", per the contract in
/// [`crate::error::VisibilityError`].
#[instrument(skip(ctx, tuple), fields(tid = ?tuple.header().self_tid(), urec_ptr = ?urec_ptr))]
pub fn walk(
    ctx: &VisibilityContext,
    tuple: &Tuple,
    mut urec_ptr: UndoPtr,
    prev_undo_xid: Option<Xid>,
) -> Result<Option<ChainStep>, VisibilityError> {
    let mut steps = 0usize;

    loop {
        steps += 1;
        if steps > ctx.config.max_chain_walk_steps() {
            error!(urec_ptr = ?urec_ptr, steps, "chain walk bound exceeded");
            return Err(VisibilityError::ChainWalkBoundExceeded(urec_ptr));
        }

        let record = match ctx.undo.fetch(urec_ptr, prev_undo_xid)? {
            None => {
                debug!(urec_ptr = ?urec_ptr, "undo record discarded, treating as predating horizon");
                return Ok(None);
            }
            Some(record) => record,
        };

        match &record.prior_image {
            Some(image) => {
                let prior_header = TupleHeader::new(
                    tuple.header().self_tid(),
                    image.flags,
                    image.slot,
                );
                let prior_tuple = Tuple::new(prior_header, image.data.clone());
                let next_ptr = record.blkprev;
                let prior_xid = record.prev_xid;
                let prior_cid = record.cid;
                ctx.undo.release(urec_ptr);
                debug!(urec_ptr = ?urec_ptr, prior_xid = ?prior_xid, rec_type = ?record.rec_type, "reconstructed prior tuple version");
                return Ok(Some(ChainStep {
                    prior_tuple,
                    prior_xid,
                    prior_cid,
                    next_ptr,
                }));
            }
            None => {
                // XidLockOnly / InvalidXactSlot / Insert markers carry no
                // content change; keep walking the same chain.
                let next_ptr = record.blkprev;
                ctx.undo.release(urec_ptr);
                if record.rec_type == UndoRecordType::Insert {
                    debug!(urec_ptr = ?urec_ptr, "reached insert root, chain ends");
                    return Ok(None);
                }
                debug!(urec_ptr = ?urec_ptr, next_ptr = ?next_ptr, rec_type = ?record.rec_type, "record carries no image, continuing");
                urec_ptr = next_ptr;
            }
        }
    }
}

/// Decides where the *next* walk hop resumes from: along this hop's own
/// `blkprev` if the prior version's transaction slot matches the current
/// version's, or re-rooted against the prior slot's own current undo
/// pointer if it switched (and isn't `Frozen`, which needs no further
/// chain at all).
pub fn next_urec_ptr(ctx: &VisibilityContext, tuple: &Tuple, step: &ChainStep) -> Option<UndoPtr> {
    use storage::tuple::TransactionSlot;

    let current_slot = tuple.header().slot();
    let prior_slot = step.prior_tuple.header().slot();

    if prior_slot == current_slot {
        return Some(step.next_ptr);
    }

    debug!(current_slot = ?current_slot, prior_slot = ?prior_slot, "chain switch: re-rooting at prior version's own slot");
    match prior_slot {
        TransactionSlot::Frozen => None,
        TransactionSlot::Index(index) => ctx
            .page
            .slot(step.prior_tuple.header().self_tid().page_id(), index)
            .map(|entry| entry.undo_ptr),
    }
}

/// Reads the successor tid off a committed `UPDATE` record, for callers
/// (the update and dirty-read predicates) that need to report where a row
/// moved to without following it themselves.
#[instrument(skip(ctx), fields(urec_ptr = ?urec_ptr))]
pub fn fetch_successor_tid(
    ctx: &VisibilityContext,
    urec_ptr: UndoPtr,
    prev_undo_xid: Option<Xid>,
) -> Result<Option<common::tid::Tid>, VisibilityError> {
    match ctx.undo.fetch(urec_ptr, prev_undo_xid)? {
        None => {
            debug!(urec_ptr = ?urec_ptr, "undo record discarded, no successor tid to report");
            Ok(None)
        }
        Some(record) => {
            let tid = record.successor_tid;
            ctx.undo.release(urec_ptr);
            debug!(urec_ptr = ?urec_ptr, successor_tid = ?tid, "read successor tid");
            Ok(tid)
        }
    }
}
