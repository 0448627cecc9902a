//! Mock collaborators for exercising the predicates without a real page
//! store, undo log, or transaction manager.

#![cfg(test)]
#![allow(dead_code)]

use common::ids::{UndoPtr, Xid};
use common::PageId;
use concurrency::oracle::{TransactionOracle, TransactionStatus};
use concurrency::snapshot::Snapshot;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use storage::{PageMetadata, SlotEntry, StorageError, UndoRecord, UndoStore};

#[derive(Debug, Default)]
pub struct FakePageStore {
    slots: HashMap<(PageId, u8), SlotEntry>,
    frozen: HashSet<PageId>,
}

impl FakePageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_slot(&mut self, page: PageId, index: u8, entry: SlotEntry) {
        self.slots.insert((page, index), entry);
    }

    pub fn freeze(&mut self, page: PageId) {
        self.frozen.insert(page);
    }
}

impl PageMetadata for FakePageStore {
    fn slot(&self, page: PageId, index: u8) -> Option<SlotEntry> {
        self.slots.get(&(page, index)).copied()
    }

    fn is_frozen(&self, page: PageId) -> bool {
        self.frozen.contains(&page)
    }
}

/// Records every fetch/release so tests can assert the resource-release
/// invariant: every `Some`-returning fetch is matched by exactly one
/// release.
#[derive(Debug, Default)]
pub struct FakeUndoStore {
    records: HashMap<UndoPtr, UndoRecord>,
    outstanding: RefCell<HashMap<UndoPtr, u32>>,
}

impl FakeUndoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ptr: UndoPtr, record: UndoRecord) {
        self.records.insert(ptr, record);
    }

    /// True once every fetched record has a matching release and none are
    /// still outstanding.
    pub fn all_released(&self) -> bool {
        self.outstanding.borrow().values().all(|count| *count == 0)
    }
}

impl UndoStore for FakeUndoStore {
    fn fetch(
        &self,
        ptr: UndoPtr,
        _prev_undo_xid: Option<Xid>,
    ) -> Result<Option<UndoRecord>, StorageError> {
        match self.records.get(&ptr) {
            Some(record) => {
                *self.outstanding.borrow_mut().entry(ptr).or_insert(0) += 1;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    fn release(&self, ptr: UndoPtr) {
        if let Some(count) = self.outstanding.borrow_mut().get_mut(&ptr) {
            *count = count.saturating_sub(1);
        }
    }
}

/// A transaction oracle driven entirely by explicit per-xid status, for
/// deterministic tests.
#[derive(Debug, Default)]
pub struct FakeOracle {
    statuses: RefCell<HashMap<Xid, TransactionStatus>>,
}

impl FakeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, xid: Xid, status: TransactionStatus) {
        self.statuses.borrow_mut().insert(xid, status);
    }

    pub fn committed(&self, xid: Xid) -> &Self {
        self.set_status(xid, TransactionStatus::Committed);
        self
    }

    pub fn aborted(&self, xid: Xid) -> &Self {
        self.set_status(xid, TransactionStatus::Aborted);
        self
    }

    pub fn in_progress(&self, xid: Xid) -> &Self {
        self.set_status(xid, TransactionStatus::InProgress);
        self
    }
}

impl TransactionOracle for FakeOracle {
    fn is_in_progress(&self, xid: Xid) -> bool {
        self.statuses
            .borrow()
            .get(&xid)
            .copied()
            .unwrap_or(TransactionStatus::InProgress)
            == TransactionStatus::InProgress
    }

    fn did_commit(&self, xid: Xid) -> bool {
        self.statuses.borrow().get(&xid).copied() == Some(TransactionStatus::Committed)
    }
}

pub fn snapshot_with_xips(xmin: Xid, xmax: Xid, xips: &[Xid], curcid: u32) -> Snapshot {
    Snapshot::new(
        xmin,
        xmax,
        xips.iter().copied().collect(),
        common::ids::CommandId::new(curcid),
    )
}
