//! Component C5: recovering the true producer of a tuple whose header's
//! transaction-slot index has been recycled for a later transaction.
//!
//! A page keeps only a small, fixed-size slot array. When a slot is about
//! to be reused, an `InvalidXactSlot` undo record preserves the (xid, cid)
//! pair it used to hold, chained into the same per-page undo history the
//! slot's current occupant writes into. Recovering the original producer
//! means walking that chain, unwinding one `InvalidXactSlot` record per
//! reuse, until a record belonging to the real producer's own operation is
//! reached.

use crate::context::VisibilityContext;
use crate::error::VisibilityError;
use common::ids::{CommandId, UndoPtr, Xid};
use storage::tuple::TupleHeader;
use storage::UndoRecordType;
use tracing::{debug, error, instrument};

#[instrument(skip(ctx, header), fields(tid = ?header.self_tid(), index))]
pub fn resolve_xact_info(
    ctx: &VisibilityContext,
    header: &TupleHeader,
    index: u8,
) -> Result<(Xid, CommandId, UndoPtr), VisibilityError> {
    let entry = ctx.page.slot(header.self_tid().page_id(), index).ok_or_else(|| {
        error!(tid = ?header.self_tid(), index, "page metadata has no such slot");
        VisibilityError::UnresolvableSlot(header.self_tid())
    })?;

    // `known` tracks the producer implied by the last `InvalidXactSlot`
    // record we unwound; it starts as the slot's current (wrong) occupant
    // and is corrected every time we unwind one more reuse.
    let mut known_xid = entry.xid;
    let mut known_cid = entry.cid;
    let mut ptr = entry.undo_ptr;
    let mut steps = 0usize;

    loop {
        steps += 1;
        if steps > ctx.config.max_chain_walk_steps() {
            error!(ptr = ?ptr, steps, "chain walk bound exceeded while resolving invalid slot");
            return Err(VisibilityError::ChainWalkBoundExceeded(ptr));
        }

        let record = match ctx.undo.fetch(ptr, None)? {
            None => {
                // Discarded: the slot's last-known reuse predates the
                // horizon, so the producer we've already unwound to is as
                // far back as we can or need to go.
                debug!(ptr = ?ptr, xid = ?known_xid, "undo record discarded, producer predates horizon");
                return Ok((known_xid, known_cid, ptr));
            }
            Some(record) => record,
        };
        ctx.undo.release(ptr);

        if record.rec_type == UndoRecordType::InvalidXactSlot {
            known_xid = record.prev_xid;
            known_cid = record.cid;
            ptr = record.blkprev;
            debug!(ptr = ?ptr, xid = ?known_xid, "unwound one slot reuse, continuing");
            continue;
        }

        // The type changed away from `InvalidXactSlot`: this record is the
        // real producer's own operation, and `known_xid`/`known_cid` (read
        // off the `InvalidXactSlot` record that preserved them) name it.
        debug!(xid = ?known_xid, cid = ?known_cid, "resolved producer for recycled slot");
        return Ok((known_xid, known_cid, ptr));
    }
}
