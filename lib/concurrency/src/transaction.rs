#![allow(dead_code)]

use common::ids::{CommandId, Xid};
use getset::{CopyGetters, Setters};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    Running,
    Committed,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IsolationLevel {
    ReadUncommitted,
    SnapshotIsolation,
    Serializable,
}

#[derive(Debug, Error, Clone)]
pub enum TransactionError {
    #[error("invalid access of transaction")]
    InvalidAccess,
}

/// A running (or finished) transaction, as seen from the visibility engine's
/// side: just enough to hand out command ids and answer "is this my xid".
/// Write-set bookkeeping, scan predicates, and undo-log staging belong to
/// the executor driving this transaction, not to the engine reading its
/// effects back, so they are left out here.
#[derive(Debug, Clone, CopyGetters, Setters, TypedBuilder)]
#[getset(get_copy = "pub", set = "pub")]
pub struct Transaction {
    isolation_level: IsolationLevel,
    xid: Xid,
    #[getset(skip)]
    state: Arc<RwLock<TransactionState>>,
    #[getset(skip)]
    #[builder(default = Arc::new(AtomicU32::new(0)))]
    next_cid: Arc<AtomicU32>,
}

impl Transaction {
    pub fn new(isolation_level: IsolationLevel, xid: Xid) -> Self {
        info!(%xid, ?isolation_level, "starting transaction");

        Transaction::builder()
            .isolation_level(isolation_level)
            .xid(xid)
            .state(Arc::new(RwLock::new(TransactionState::Running)))
            .build()
    }

    pub fn state(&self) -> TransactionState {
        *self.state.read()
    }

    /// Advances and returns the command id for the next statement this
    /// transaction executes. The first statement sees `CommandId(0)`.
    pub fn next_command_id(&self) -> CommandId {
        CommandId::new(self.next_cid.fetch_add(1, Ordering::SeqCst))
    }

    pub fn current_command_id(&self) -> CommandId {
        CommandId::new(self.next_cid.load(Ordering::SeqCst).saturating_sub(1))
    }

    pub fn commit(&self) -> Result<(), TransactionError> {
        let mut state = self.state.write();
        if *state != TransactionState::Running {
            return Err(TransactionError::InvalidAccess);
        }
        *state = TransactionState::Committed;
        Ok(())
    }

    pub fn abort(&self) -> Result<(), TransactionError> {
        let mut state = self.state.write();
        if *state != TransactionState::Running {
            return Err(TransactionError::InvalidAccess);
        }
        *state = TransactionState::Aborted;
        Ok(())
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.xid == other.xid
    }
}

impl Eq for Transaction {}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transaction {{ xid: {}, state: {:?} }}", self.xid, self.state())
    }
}
