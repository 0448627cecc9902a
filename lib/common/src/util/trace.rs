use anyhow::Result;
use tracing::instrument;
use tracing_subscriber::EnvFilter;

/// Installs a plain `tracing` subscriber, honoring `RUST_LOG` for per-module
/// filtering. There is no interactive surface in this crate, so unlike the
/// CLI this stays a bare `fmt` layer rather than anything progress-bar-aware.
#[instrument]
pub fn initialize_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}
