#![allow(dead_code)]

use crate::PageId;
use getset::{CopyGetters, Setters};
use serde::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

/// Identifies a tuple version's physical slot: the page it lives on and its
/// offset within that page's slot array.
///
/// `Tid` plays the role `RID` plays elsewhere in the storage stack, but is
/// named for what it identifies here: a tuple's location, used both as the
/// header's self-identifier and as the successor pointer an `UPDATE` undo
/// record carries forward.
///
/// # Examples
///
/// ```rust,no_run
/// use common::tid::Tid;
/// use common::PageId;
///
/// let tid = Tid::new(PageId::from(1), 5);
/// assert_eq!(tid.to_string(), "Tid(PageId(1), 5)");
/// ```
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    CopyGetters,
    Setters,
    TypedBuilder,
)]
#[getset(get_copy = "pub", set = "pub")]
pub struct Tid {
    page_id: PageId,
    offset: u32,
}

impl Tid {
    pub fn new(page_id: PageId, offset: u32) -> Self {
        Self { page_id, offset }
    }
}

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tid({}, {})", self.page_id, self.offset)
    }
}
