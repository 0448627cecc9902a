//! `satisfies_oldest_xmin`: classifies a tuple version relative to a single
//! scalar (the oldest xmin any current or future snapshot could need), for
//! vacuum-style callers deciding whether a version can be reclaimed. Unlike
//! the read-path predicates, it never walks undo: the prior versions behind
//! an undo chain are each visited by the same sweep independently.

use crate::context::VisibilityContext;
use crate::error::VisibilityError;
use crate::state::{self, OldestXminState, Resolved, SimpleBucket};
use common::ids::Xid;
use storage::tuple::Tuple;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OldestXminVerdict {
    Live,
    Dead,
    RecentlyDead,
    InsertInProgress,
    DeleteInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OldestXminOutcome {
    pub verdict: OldestXminVerdict,
    pub xid: Xid,
}

#[instrument(skip(ctx, tuple), fields(tid = ?tuple.header().self_tid(), oldest_xmin = ?oldest_xmin))]
pub fn satisfies_oldest_xmin(
    ctx: &VisibilityContext,
    tuple: &Tuple,
    oldest_xmin: Xid,
    reader: Xid,
) -> Result<OldestXminOutcome, VisibilityError> {
    let resolved = state::resolve(ctx, tuple.header())?;
    let flags = tuple.header().flags();

    let (xid, _cid, _urec_ptr) = match resolved {
        Resolved::Frozen => {
            let verdict = if flags.is_deleted_or_updated() {
                OldestXminVerdict::Dead
            } else {
                OldestXminVerdict::Live
            };
            return Ok(OldestXminOutcome {
                verdict,
                xid: Xid::INVALID,
            });
        }
        Resolved::Active { xid, cid, urec_ptr } => (xid, cid, urec_ptr),
    };

    if ctx.precedes_horizon(xid) {
        let verdict = if flags.is_deleted_or_updated() {
            OldestXminVerdict::Dead
        } else {
            OldestXminVerdict::Live
        };
        return Ok(OldestXminOutcome { verdict, xid });
    }

    let bucket = state::bucket_simple(ctx, xid, reader);

    let verdict = match state::classify_for_oldest_xmin(flags) {
        OldestXminState::DeletedOrUpdated => match bucket {
            SimpleBucket::CurrentOrInProgress => OldestXminVerdict::DeleteInProgress,
            SimpleBucket::Committed => {
                if !ctx.oracle.precedes(xid, oldest_xmin) {
                    OldestXminVerdict::RecentlyDead
                } else {
                    OldestXminVerdict::Dead
                }
            }
            SimpleBucket::Aborted => OldestXminVerdict::Live,
        },
        OldestXminState::LockOnly => OldestXminVerdict::Live,
        OldestXminState::InsertOrInplaceUpdated => match bucket {
            SimpleBucket::CurrentOrInProgress => OldestXminVerdict::InsertInProgress,
            SimpleBucket::Committed => OldestXminVerdict::Live,
            // FIXME: an aborted in-place update should resurrect the prior
            // image rather than be reported dead outright; upstream leaves
            // this case unresolved too.
            SimpleBucket::Aborted => {
                debug!(xid = ?xid, "aborted in-place update, defaulting to dead");
                OldestXminVerdict::Dead
            }
        },
    };

    debug!(verdict = ?verdict, xid = ?xid, "oldest-xmin verdict");
    Ok(OldestXminOutcome { verdict, xid })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeOracle, FakePageStore, FakeUndoStore};
    use common::ids::CommandId;
    use common::tid::Tid;
    use common::PageId;
    use storage::tuple::{TransactionSlot, TupleFlags, TupleHeader};
    use storage::SlotEntry;

    fn tuple_at(flags: TupleFlags, index: u8) -> Tuple {
        let header = TupleHeader::new(
            Tid::new(PageId::new(1), 0),
            flags,
            TransactionSlot::Index(index),
        );
        Tuple::new(header, b"row".to_vec())
    }

    #[test]
    fn committed_delete_older_than_oldest_xmin_is_dead() {
        let mut page = FakePageStore::new();
        page.set_slot(
            PageId::new(1),
            0,
            SlotEntry {
                xid: Xid::new(100),
                undo_ptr: common::ids::UndoPtr::new(1),
                cid: CommandId::new(1),
            },
        );
        let undo = FakeUndoStore::new();
        let oracle = FakeOracle::new();
        oracle.committed(Xid::new(100));
        let ctx = VisibilityContext::new(&page, &undo, &oracle, Xid::new(90));
        let tuple = tuple_at(TupleFlags::DELETED, 0);

        let outcome =
            satisfies_oldest_xmin(&ctx, &tuple, Xid::new(150), Xid::new(200)).unwrap();
        assert_eq!(outcome.verdict, OldestXminVerdict::Dead);
        assert_eq!(outcome.xid, Xid::new(100));
    }

    #[test]
    fn committed_delete_still_needed_by_some_snapshot_is_recently_dead() {
        let mut page = FakePageStore::new();
        page.set_slot(
            PageId::new(1),
            0,
            SlotEntry {
                xid: Xid::new(150),
                undo_ptr: common::ids::UndoPtr::new(1),
                cid: CommandId::new(1),
            },
        );
        let undo = FakeUndoStore::new();
        let oracle = FakeOracle::new();
        oracle.committed(Xid::new(150));
        let ctx = VisibilityContext::new(&page, &undo, &oracle, Xid::new(90));
        let tuple = tuple_at(TupleFlags::DELETED, 0);

        let outcome =
            satisfies_oldest_xmin(&ctx, &tuple, Xid::new(100), Xid::new(200)).unwrap();
        assert_eq!(outcome.verdict, OldestXminVerdict::RecentlyDead);
    }

    #[test]
    fn frozen_live_tuple_is_live() {
        let page = FakePageStore::new();
        let undo = FakeUndoStore::new();
        let oracle = FakeOracle::new();
        let ctx = VisibilityContext::new(&page, &undo, &oracle, Xid::new(90));
        let tuple = tuple_at(TupleFlags::empty(), 0);
        let header = TupleHeader::new(
            tuple.header().self_tid(),
            TupleFlags::empty(),
            TransactionSlot::Frozen,
        );
        let tuple = Tuple::new(header, tuple.data().clone());

        let outcome =
            satisfies_oldest_xmin(&ctx, &tuple, Xid::new(100), Xid::new(200)).unwrap();
        assert_eq!(outcome.verdict, OldestXminVerdict::Live);
    }
}
