//! The transaction oracle: the single source of truth the visibility engine
//! consults to classify a producer xid relative to the reading transaction.

#![allow(dead_code)]

use crate::snapshot::Snapshot;
use common::ids::Xid;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    InProgress,
    Committed,
    Aborted,
}

/// Everything a visibility predicate needs to know about producer
/// transactions and the reader's own identity. Implemented once by the real
/// transaction manager in a full system, and by a simple in-memory table in
/// tests.
pub trait TransactionOracle {
    /// True when `xid` is the transaction performing the read itself.
    fn is_current(&self, xid: Xid, reader: Xid) -> bool {
        xid == reader
    }

    /// True when `xid` has neither committed nor aborted yet.
    fn is_in_progress(&self, xid: Xid) -> bool;

    /// True when `xid` committed. Implementations must agree with
    /// [`TransactionOracle::is_in_progress`]: a xid is in exactly one of
    /// in-progress, committed, or aborted.
    fn did_commit(&self, xid: Xid) -> bool;

    /// Wraparound-aware "happens before" on the transaction id space.
    fn precedes(&self, a: Xid, b: Xid) -> bool {
        a.precedes(&b)
    }

    /// True when `xid` was still running as of the time `snapshot` was
    /// taken, i.e. its effects are not visible under that snapshot even if
    /// it has since committed.
    fn in_mvcc_snapshot(&self, xid: Xid, snapshot: &Snapshot) -> bool {
        if xid.precedes(&snapshot.xmin) {
            return false;
        }
        if snapshot.xmax.precedes_or_eq(&xid) {
            return true;
        }
        snapshot.xip_list.contains(&xid)
    }
}

/// An in-memory transaction table, standing in for the real commit log in
/// tests: records each xid's terminal status as transactions finish.
#[derive(Debug, Default)]
pub struct InMemoryOracle {
    statuses: RwLock<HashMap<Xid, TransactionStatus>>,
}

impl InMemoryOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, xid: Xid, status: TransactionStatus) {
        self.statuses.write().insert(xid, status);
    }

    fn status_of(&self, xid: Xid) -> TransactionStatus {
        *self
            .statuses
            .read()
            .get(&xid)
            .unwrap_or(&TransactionStatus::InProgress)
    }
}

impl TransactionOracle for InMemoryOracle {
    fn is_in_progress(&self, xid: Xid) -> bool {
        self.status_of(xid) == TransactionStatus::InProgress
    }

    fn did_commit(&self, xid: Xid) -> bool {
        self.status_of(xid) == TransactionStatus::Committed
    }
}
