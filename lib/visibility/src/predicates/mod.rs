//! Component C7: the five visibility predicates, each combining the shared
//! resolver/walker/bucketing helpers into its own decision table.

pub mod any;
pub mod dirty;
pub mod mvcc;
pub mod oldest_xmin;
pub mod surely_dead;
pub mod update;

pub use any::satisfies_any;
pub use dirty::satisfies_dirty;
pub use mvcc::satisfies_mvcc;
pub use oldest_xmin::{satisfies_oldest_xmin, OldestXminOutcome, OldestXminVerdict};
pub use surely_dead::is_surely_dead;
pub use update::{satisfies_update, UpdateOutcome, UpdateVerdict};
