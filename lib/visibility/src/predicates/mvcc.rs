//! `satisfies_mvcc`: the ordinary snapshot-read visibility check. Returns
//! the visible version of a tuple under `snapshot`, or `None` if nothing
//! about it is visible to the reader.

use crate::context::VisibilityContext;
use crate::error::VisibilityError;
use crate::state::{self, Resolved, TupleState, XactBucket};
use crate::walker;
use common::ids::Xid;
use common::UndoPtr;
use concurrency::snapshot::Snapshot;
use storage::tuple::Tuple;
use tracing::{debug, instrument};

#[instrument(skip(ctx, tuple, snapshot), fields(tid = ?tuple.header().self_tid(), reader = ?reader))]
pub fn satisfies_mvcc(
    ctx: &VisibilityContext,
    tuple: &Tuple,
    snapshot: &Snapshot,
    reader: Xid,
) -> Result<Option<Tuple>, VisibilityError> {
    let resolved = state::resolve(ctx, tuple.header())?;
    let result = decide(ctx, tuple, resolved, snapshot, reader, None);
    debug!(visible = result.as_ref().map(|r| r.is_some()).unwrap_or(false), "mvcc verdict");
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
    snapshot: &Snapshot,
    reader: Xid,
    prev_undo_xid: Option<Xid>,
) -> Result<Option<Tuple>, VisibilityError> {
    let (xid, cid, urec_ptr) = match resolved {
        Resolved::Frozen => return Ok(frozen_result(tuple)),
        Resolved::Active { xid, cid, urec_ptr } => (xid, cid, urec_ptr),
    };

    if ctx.precedes_horizon(xid) {
        return Ok(frozen_result(tuple));
    }

    let flags = tuple.header().flags();
    let bucket = state::bucket_via_snapshot(ctx, xid, reader, snapshot);

    let walk_back = |ctx: &VisibilityContext| -> Result<Option<Tuple>, VisibilityError> {
        walk_and_recurse(ctx, tuple, urec_ptr, prev_undo_xid, snapshot, reader)
    };

    match state::classify(flags) {
        TupleState::DeletedOrUpdated => match bucket {
            XactBucket::Current => {
                if cid < snapshot.curcid() {
                    Ok(Some(tuple.clone()))
                } else {
                    walk_back(ctx)
                }
            }
            XactBucket::InSnapshot => walk_back(ctx),
            XactBucket::Committed => Ok(None),
            XactBucket::Aborted => Ok(Some(tuple.clone())),
        },
        TupleState::InplaceOrLockOnly => match bucket {
            XactBucket::Current => {
                if flags.is_lock_only() || cid < snapshot.curcid() {
                    Ok(Some(tuple.clone()))
                } else {
                    walk_back(ctx)
                }
            }
            XactBucket::InSnapshot => walk_back(ctx),
            XactBucket::Committed => Ok(Some(tuple.clone())),
            XactBucket::Aborted => walk_back(ctx),
        },
        TupleState::Other => match bucket {
            XactBucket::Current => {
                if cid < snapshot.curcid() {
                    Ok(Some(tuple.clone()))
                } else {
                    Ok(None)
                }
            }
            XactBucket::InSnapshot => Ok(None),
            XactBucket::Committed => Ok(Some(tuple.clone())),
            XactBucket::Aborted => Ok(None),
        },
    }
}

/// Walks one hop back and recursively applies the same visibility
/// semantics to the prior version. A discarded record is treated as
/// "predates the horizon", i.e. fully committed and visible — the current,
/// not-walked-past, tuple stands.
fn walk_and_recurse(
    ctx: &VisibilityContext,
    tuple: &Tuple,
    urec_ptr: UndoPtr,
    prev_undo_xid: Option<Xid>,
    snapshot: &Snapshot,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{snapshot_with_xips, FakeOracle, FakePageStore, FakeUndoStore};
    use common::ids::{CommandId, UndoPtr};
    use common::tid::Tid;
    use common::PageId;
    use storage::tuple::{TransactionSlot, TupleFlags, TupleHeader};
    use storage::{SlotEntry, UndoRecord, UndoRecordType};

    const T1: u32 = 100;
    const T2: u32 = 101;
    const ME: u32 = 102;
    const HORIZON: u32 = 90;

    fn plain_tuple(slot: TransactionSlot) -> Tuple {
        let header = TupleHeader::new(Tid::new(PageId::new(1), 0), TupleFlags::empty(), slot);
        Tuple::new(header, b"row".to_vec())
    }

    #[test]
    fn s1_committed_insert_with_no_updates_is_live() {
        let mut page = FakePageStore::new();
        page.set_slot(
            PageId::new(1),
            0,
            SlotEntry {
                xid: Xid::new(T1),
                undo_ptr: UndoPtr::new(1),
                cid: CommandId::new(0),
            },
        );
        let undo = FakeUndoStore::new();
        let oracle = FakeOracle::new();
        oracle.committed(Xid::new(T1));
        let ctx = VisibilityContext::new(&page, &undo, &oracle, Xid::new(HORIZON));
        let tuple = plain_tuple(TransactionSlot::Index(0));
        let snapshot = snapshot_with_xips(Xid::new(T1 + 1), Xid::new(T1 + 3), &[], 5);

        let result = satisfies_mvcc(&ctx, &tuple, &snapshot, Xid::new(ME)).unwrap();
        assert_eq!(result, Some(tuple));
        assert!(undo.all_released());
    }

    #[test]
    fn s3_self_inplace_update_visible_when_cid_precedes_curcid() {
        let mut page = FakePageStore::new();
        page.set_slot(
            PageId::new(1),
            0,
            SlotEntry {
                xid: Xid::new(ME),
                undo_ptr: UndoPtr::new(1),
                cid: CommandId::new(3),
            },
        );
        let undo = FakeUndoStore::new();
        let oracle = FakeOracle::new();
        let ctx = VisibilityContext::new(&page, &undo, &oracle, Xid::new(HORIZON));
        let header = TupleHeader::new(
            Tid::new(PageId::new(1), 0),
            TupleFlags::INPLACE_UPDATED,
            TransactionSlot::Index(0),
        );
        let tuple = Tuple::new(header, b"post".to_vec());
        let snapshot = snapshot_with_xips(Xid::new(T1), Xid::new(T1 + 5), &[], 5);

        let result = satisfies_mvcc(&ctx, &tuple, &snapshot, Xid::new(ME)).unwrap();
        assert_eq!(result, Some(tuple));
    }

    #[test]
    fn s4_self_inplace_update_walks_to_preimage_when_cid_follows_curcid() {
        let mut page = FakePageStore::new();
        let undo_ptr = UndoPtr::new(1);
        let root_ptr = UndoPtr::new(0);
        page.set_slot(
            PageId::new(1),
            0,
            SlotEntry {
                xid: Xid::new(ME),
                undo_ptr,
                cid: CommandId::new(7),
            },
        );
        let mut undo = FakeUndoStore::new();
        undo.insert(
            undo_ptr,
            UndoRecord {
                rec_type: UndoRecordType::InplaceUpdate,
                prev_xid: Xid::new(T1),
                cid: CommandId::new(0),
                blkprev: root_ptr,
                prior_image: Some(storage::TupleImagePayload {
                    flags: TupleFlags::empty(),
                    slot: TransactionSlot::Index(0),
                    data: b"pre".to_vec(),
                }),
                successor_tid: None,
            },
        );
        let oracle = FakeOracle::new();
        oracle.committed(Xid::new(T1));
        let ctx = VisibilityContext::new(&page, &undo, &oracle, Xid::new(HORIZON));
        let header = TupleHeader::new(
            Tid::new(PageId::new(1), 0),
            TupleFlags::INPLACE_UPDATED,
            TransactionSlot::Index(0),
        );
        let tuple = Tuple::new(header, b"post".to_vec());
        let snapshot = snapshot_with_xips(Xid::new(T1 + 1), Xid::new(T1 + 3), &[], 5);

        let result = satisfies_mvcc(&ctx, &tuple, &snapshot, Xid::new(ME)).unwrap();
        assert_eq!(result.unwrap().data().as_slice(), b"pre".as_slice());
        assert!(undo.all_released());
    }

    #[test]
    fn s5_delete_by_aborted_xact_walks_back_to_committed_insert() {
        let mut page = FakePageStore::new();
        let undo_ptr = UndoPtr::new(1);
        let root_ptr = UndoPtr::new(0);
        page.set_slot(
            PageId::new(1),
            0,
            SlotEntry {
                xid: Xid::new(T2),
                undo_ptr,
                cid: CommandId::new(0),
            },
        );
        let mut undo = FakeUndoStore::new();
        undo.insert(
            undo_ptr,
            UndoRecord {
                rec_type: UndoRecordType::Delete,
                prev_xid: Xid::new(T1),
                cid: CommandId::new(0),
                blkprev: root_ptr,
                prior_image: Some(storage::TupleImagePayload {
                    flags: TupleFlags::empty(),
                    slot: TransactionSlot::Index(0),
                    data: b"row".to_vec(),
                }),
                successor_tid: None,
            },
        );
        let oracle = FakeOracle::new();
        oracle.aborted(Xid::new(T2));
        oracle.committed(Xid::new(T1));
        let ctx = VisibilityContext::new(&page, &undo, &oracle, Xid::new(HORIZON));
        let header = TupleHeader::new(
            Tid::new(PageId::new(1), 0),
            TupleFlags::DELETED,
            TransactionSlot::Index(0),
        );
        let tuple = Tuple::new(header, b"row".to_vec());
        let snapshot = snapshot_with_xips(Xid::new(T1 + 1), Xid::new(T1 + 3), &[], 5);

        let result = satisfies_mvcc(&ctx, &tuple, &snapshot, Xid::new(ME)).unwrap();
        assert!(result.is_some());
    }

    #[test]
    fn s6_frozen_deleted_slot_is_invisible() {
        let page = FakePageStore::new();
        let undo = FakeUndoStore::new();
        let oracle = FakeOracle::new();
        let ctx = VisibilityContext::new(&page, &undo, &oracle, Xid::new(HORIZON));
        let header = TupleHeader::new(
            Tid::new(PageId::new(1), 0),
            TupleFlags::DELETED,
            TransactionSlot::Frozen,
        );
        let tuple = Tuple::new(header, b"row".to_vec());
        let snapshot = snapshot_with_xips(Xid::new(T1), Xid::new(T1 + 5), &[], 5);

        let result = satisfies_mvcc(&ctx, &tuple, &snapshot, Xid::new(ME)).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn cid_gate_hides_own_insert_not_yet_visible_to_itself() {
        let mut page = FakePageStore::new();
        page.set_slot(
            PageId::new(1),
            0,
            SlotEntry {
                xid: Xid::new(ME),
                undo_ptr: UndoPtr::new(1),
                cid: CommandId::new(9),
            },
        );
        let undo = FakeUndoStore::new();
        let oracle = FakeOracle::new();
        let ctx = VisibilityContext::new(&page, &undo, &oracle, Xid::new(HORIZON));
        let tuple = plain_tuple(TransactionSlot::Index(0));
        let snapshot = snapshot_with_xips(Xid::new(T1), Xid::new(T1 + 5), &[], 5);

        let result = satisfies_mvcc(&ctx, &tuple, &snapshot, Xid::new(ME)).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn pre_horizon_producer_never_touches_undo() {
        let mut page = FakePageStore::new();
        page.set_slot(
            PageId::new(1),
            0,
            SlotEntry {
                xid: Xid::new(10),
                undo_ptr: UndoPtr::new(999),
                cid: CommandId::new(0),
            },
        );
        let undo = FakeUndoStore::new();
        let oracle = FakeOracle::new();
        let ctx = VisibilityContext::new(&page, &undo, &oracle, Xid::new(HORIZON));
        let tuple = plain_tuple(TransactionSlot::Index(0));
        let snapshot = snapshot_with_xips(Xid::new(T1), Xid::new(T1 + 5), &[], 5);

        let result = satisfies_mvcc(&ctx, &tuple, &snapshot, Xid::new(ME)).unwrap();
        assert_eq!(result, Some(tuple));
        assert!(undo.all_released());
    }
}

