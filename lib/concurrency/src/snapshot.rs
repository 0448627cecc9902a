#![allow(dead_code)]

use common::ids::{CommandId, Xid};
use getset::{CopyGetters, Getters, Setters};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A point-in-time view of which transactions count as "already committed"
/// for the purpose of a read. `xmin` is the oldest xid that was still
/// running when the snapshot was taken; `xmax` is one past the newest xid
/// assigned so far; `xip_list` names the xids in `[xmin, xmax)` that were
/// running, and therefore are not visible even though they are numerically
/// old enough to be.
///
/// `xmin`/`xmax` are mutable because [`crate::snapshot`]-consuming
/// predicates such as the dirty-read check narrow them as they observe
/// concurrent activity; this is the caller's own snapshot, not shared state.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters, Setters, Serialize, Deserialize)]
pub struct Snapshot {
    #[getset(get_copy = "pub", set = "pub")]
    pub xmin: Xid,
    #[getset(get_copy = "pub", set = "pub")]
    pub xmax: Xid,
    #[getset(get = "pub")]
    pub xip_list: HashSet<Xid>,
    /// The command id of the statement that took this snapshot, used to
    /// decide self-visibility across commands of the same transaction.
    #[getset(get_copy = "pub", set = "pub")]
    pub curcid: CommandId,
}

impl Snapshot {
    pub fn new(xmin: Xid, xmax: Xid, xip_list: HashSet<Xid>, curcid: CommandId) -> Self {
        Self {
            xmin,
            xmax,
            xip_list,
            curcid,
        }
    }
}
