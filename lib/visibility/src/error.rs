use common::ids::UndoPtr;
use common::tid::Tid;
use storage::StorageError;
use thiserror::Error;

/// Failures the visibility engine can surface. None of these are retried:
/// an invariant violation means the on-disk structure is corrupt, and the
/// caller is expected to treat it as a fatal storage error rather than a
/// visibility verdict.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VisibilityError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("chain walk at {0} exceeded the configured step bound")]
    ChainWalkBoundExceeded(UndoPtr),

    #[error("tuple header at {0} sets more than one of DELETED/UPDATED/INPLACE_UPDATED/XID_LOCK_ONLY")]
    MalformedFlags(Tid),

    #[error("could not recover transaction info for a recycled slot on tuple {0}")]
    UnresolvableSlot(Tid),
}
