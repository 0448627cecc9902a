//! `satisfies_update`: the visibility check a writer runs before updating
//! or deleting a tuple it has already located. Unlike `satisfies_mvcc` it
//! never reconstructs a tuple; it reports a verdict plus enough of the
//! resolved producer's identity for the caller to act on (wait on a
//! concurrent writer, follow a move, or retry against the successor).

use crate::context::VisibilityContext;
use crate::error::VisibilityError;
use crate::state::{self, Resolved, TupleState, XactBucket};
use crate::walker;
use common::ids::{CommandId, Xid};
use common::tid::Tid;
use concurrency::snapshot::Snapshot;
use storage::tuple::Tuple;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateVerdict {
    /// No conflicting writer: caller may proceed with its own update.
    MayBeUpdated,
    /// Nothing here is visible to the caller at all.
    Invisible,
    /// The caller's own (earlier) command already updated/deleted this row.
    SelfUpdated,
    /// A concurrent transaction is in the middle of updating/deleting it.
    BeingUpdated,
    /// A concurrent transaction has already updated/deleted it and
    /// committed.
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub verdict: UpdateVerdict,
    pub xid: Xid,
    pub cid: Option<CommandId>,
    /// The successor tid, filled only when `verdict` is `Updated` by a
    /// genuine (non-in-place) move.
    pub ctid: Option<Tid>,
    /// True when the resolved operation was an in-place update or a lock,
    /// rather than a row that moved or was removed.
    pub in_place_updated_or_locked: bool,
}

impl UpdateOutcome {
    fn new(verdict: UpdateVerdict, xid: Xid) -> Self {
        Self {
            verdict,
            xid,
            cid: None,
            ctid: None,
            in_place_updated_or_locked: false,
        }
    }
}

#[instrument(skip(ctx, tuple, snapshot), fields(tid = ?tuple.header().self_tid(), reader = ?reader, lock_allowed))]
pub fn satisfies_update(
    ctx: &VisibilityContext,
    tuple: &Tuple,
    snapshot: &Snapshot,
    reader: Xid,
    lock_allowed: bool,
) -> Result<UpdateOutcome, VisibilityError> {
    let resolved = state::resolve(ctx, tuple.header())?;
    let outcome = decide(ctx, tuple, resolved, snapshot, reader, lock_allowed, None)?;
    debug!(verdict = ?outcome.verdict, xid = ?outcome.xid, "update verdict");
    Ok(outcome)
}

fn decide(
    ctx: &VisibilityContext,
    tuple: &Tuple,
    resolved: Resolved,
    snapshot: &Snapshot,
    reader: Xid,
    lock_allowed: bool,
    prev_undo_xid: Option<Xid>,
) -> Result<UpdateOutcome, VisibilityError> {
    let flags = tuple.header().flags();

    let (xid, cid, urec_ptr) = match resolved {
        Resolved::Frozen => {
            let verdict = if flags.is_deleted_or_updated() {
                UpdateVerdict::Invisible
            } else {
                UpdateVerdict::MayBeUpdated
            };
            return Ok(UpdateOutcome::new(verdict, Xid::INVALID));
        }
        Resolved::Active { xid, cid, urec_ptr } => (xid, cid, urec_ptr),
    };

    if ctx.precedes_horizon(xid) {
        let verdict = if flags.is_deleted_or_updated() {
            UpdateVerdict::Invisible
        } else {
            UpdateVerdict::MayBeUpdated
        };
        return Ok(UpdateOutcome::new(verdict, xid));
    }

    let bucket = state::bucket_via_snapshot(ctx, xid, reader, snapshot);
    let state_kind = state::classify(flags);

    let walk_back = |ctx: &VisibilityContext,
                      on_invisible: UpdateVerdict,
                      on_visible: UpdateVerdict|
     -> Result<UpdateOutcome, VisibilityError> {
        match walker::walk(ctx, tuple, urec_ptr, prev_undo_xid)? {
            None => Ok(UpdateOutcome {
                xid,
                cid: Some(cid),
                ..UpdateOutcome::new(on_visible, xid)
            }),
            Some(step) => {
                let resolved = state::resolved_after_step(ctx, tuple, &step);
                let inner = decide(
                    ctx,
                    &step.prior_tuple,
                    resolved,
                    snapshot,
                    reader,
                    lock_allowed,
                    Some(step.prior_xid),
                )?;
                let verdict = if inner.verdict == UpdateVerdict::Invisible {
                    on_invisible
                } else {
                    on_visible
                };
                Ok(UpdateOutcome {
                    xid,
                    cid: Some(cid),
                    ..UpdateOutcome::new(verdict, xid)
                })
            }
        }
    };

    let mut outcome = match state_kind {
        TupleState::DeletedOrUpdated => match bucket {
            XactBucket::Current => {
                if cid < snapshot.curcid() {
                    UpdateOutcome {
                        cid: Some(cid),
                        ..UpdateOutcome::new(UpdateVerdict::MayBeUpdated, xid)
                    }
                } else {
                    walk_back(ctx, UpdateVerdict::Invisible, UpdateVerdict::SelfUpdated)?
                }
            }
            XactBucket::InSnapshot => UpdateOutcome {
                cid: Some(cid),
                ..UpdateOutcome::new(UpdateVerdict::BeingUpdated, xid)
            },
            XactBucket::Committed => {
                let ctid = if flags.contains(storage::tuple::TupleFlags::UPDATED) {
                    walker::fetch_successor_tid(ctx, urec_ptr, prev_undo_xid)?
                } else {
                    None
                };
                UpdateOutcome {
                    cid: Some(cid),
                    ctid,
                    ..UpdateOutcome::new(UpdateVerdict::Updated, xid)
                }
            }
            XactBucket::Aborted => {
                walk_back(ctx, UpdateVerdict::Invisible, UpdateVerdict::MayBeUpdated)?
            }
        },
        TupleState::InplaceOrLockOnly => {
            let mut outcome = match bucket {
                XactBucket::Current => {
                    if flags.is_lock_only() || cid < snapshot.curcid() {
                        UpdateOutcome {
                            cid: Some(cid),
                            ..UpdateOutcome::new(UpdateVerdict::MayBeUpdated, xid)
                        }
                    } else {
                        walk_back(ctx, UpdateVerdict::Invisible, UpdateVerdict::SelfUpdated)?
                    }
                }
                XactBucket::InSnapshot => UpdateOutcome {
                    cid: Some(cid),
                    ..UpdateOutcome::new(UpdateVerdict::BeingUpdated, xid)
                },
                XactBucket::Committed => {
                    let verdict = if lock_allowed || !ctx.oracle.in_mvcc_snapshot(xid, snapshot) {
                        UpdateVerdict::MayBeUpdated
                    } else {
                        UpdateVerdict::Updated
                    };
                    UpdateOutcome {
                        cid: Some(cid),
                        ..UpdateOutcome::new(verdict, xid)
                    }
                }
                XactBucket::Aborted => {
                    walk_back(ctx, UpdateVerdict::Invisible, UpdateVerdict::MayBeUpdated)?
                }
            };
            outcome.in_place_updated_or_locked = true;
            outcome
        }
        TupleState::Other => match bucket {
            XactBucket::Current => {
                let verdict = if cid < snapshot.curcid() {
                    UpdateVerdict::MayBeUpdated
                } else {
                    UpdateVerdict::Invisible
                };
                UpdateOutcome {
                    cid: Some(cid),
                    ..UpdateOutcome::new(verdict, xid)
                }
            }
            XactBucket::InSnapshot => UpdateOutcome {
                cid: Some(cid),
                ..UpdateOutcome::new(UpdateVerdict::BeingUpdated, xid)
            },
            XactBucket::Committed => UpdateOutcome {
                cid: Some(cid),
                ..UpdateOutcome::new(UpdateVerdict::MayBeUpdated, xid)
            },
            XactBucket::Aborted => UpdateOutcome {
                cid: Some(cid),
                ..UpdateOutcome::new(UpdateVerdict::Invisible, xid)
            },
        },
    };
    outcome.xid = xid;
    Ok(outcome)
}
