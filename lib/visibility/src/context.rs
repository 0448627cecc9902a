use common::config::VisibilityConfig;
use common::ids::Xid;
use concurrency::oracle::TransactionOracle;
use storage::{PageMetadata, UndoStore};

/// Bundles the engine's external collaborators: the page's transaction-slot
/// array, the undo log, the transaction oracle, and the retained undo
/// horizon. Every predicate takes one of these rather than its four pieces
/// separately.
pub struct VisibilityContext<'a> {
    pub page: &'a dyn PageMetadata,
    pub undo: &'a dyn UndoStore,
    pub oracle: &'a dyn TransactionOracle,
    /// The oldest xid whose undo is still guaranteed to be retained
    /// (`RecentGlobalXmin`). Producers older than this are treated as fully
    /// committed without recursing into undo at all.
    pub horizon: Xid,
    pub config: VisibilityConfig,
}

impl<'a> VisibilityContext<'a> {
    pub fn new(
        page: &'a dyn PageMetadata,
        undo: &'a dyn UndoStore,
        oracle: &'a dyn TransactionOracle,
        horizon: Xid,
    ) -> Self {
        Self {
            page,
            undo,
            oracle,
            horizon,
            config: VisibilityConfig::default(),
        }
    }

    pub fn with_config(mut self, config: VisibilityConfig) -> Self {
        self.config = config;
        self
    }

    pub fn precedes_horizon(&self, xid: Xid) -> bool {
        xid.precedes(&self.horizon)
    }
}
