//! `is_surely_dead`: a fast, walk-free check for whether a tuple version can
//! never become visible to anyone again, used to skip the full oldest-xmin
//! sweep for the common case.

use crate::context::VisibilityContext;
use crate::error::VisibilityError;
use crate::state::{self, Resolved};
use common::ids::Xid;
use storage::tuple::Tuple;
use tracing::{debug, instrument};

#[instrument(skip(ctx, tuple), fields(tid = ?tuple.header().self_tid()))]
pub fn is_surely_dead(
    ctx: &VisibilityContext,
    tuple: &Tuple,
    _oldest_xmin: Xid,
) -> Result<bool, VisibilityError> {
    let resolved = state::resolve(ctx, tuple.header())?;
    let flags = tuple.header().flags();

    if !flags.is_deleted_or_updated() {
        return Ok(false);
    }

    let frozen_or_pre_horizon = match resolved {
        Resolved::Frozen => true,
        Resolved::Active { xid, .. } => ctx.precedes_horizon(xid),
    };

    debug!(surely_dead = frozen_or_pre_horizon, "surely-dead verdict");
    Ok(frozen_or_pre_horizon)
}
