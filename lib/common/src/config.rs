//! Engine-wide configuration knobs, layered from defaults, an optional file,
//! and the environment, in the same shape the rest of the storage stack uses.

#![allow(dead_code)]

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use getset::{CopyGetters, Setters};
use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;
use std::fmt;
use thiserror::Error;
use typed_builder::TypedBuilder;

/// The size of a page in bytes (4 KiB). Pages are a fixed-size block of data and
/// are the unit of data transfer between disk and memory.
pub const PAGE_SIZE: usize = 4096;

/// Default bound on how many undo records the chain walker will traverse for
/// a single visibility call before giving up with [`VisibilityConfig::max_chain_walk_steps`]
/// exhausted. The walker recurses one stack frame per step; this exists to
/// keep that recursion bounded rather than to model anything about the data.
pub const DEFAULT_MAX_CHAIN_WALK_STEPS: usize = 10_000;

/// Unique identifier for a frame. Frames are identified by a monotonically increasing integer
/// and are the unit of storage in the buffer pool.
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
    Shrinkwrap,
)]
pub struct FrameId(pub u32);

impl FrameId {
    pub fn new(frame_id: u32) -> Self {
        Self(frame_id)
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameId({})", self.0)
    }
}

/// Unique identifier for a page.
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
    Shrinkwrap,
)]
pub struct PageId(pub u32);

impl PageId {
    pub fn new(page_id: u32) -> Self {
        Self(page_id)
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl From<i64> for PageId {
    fn from(page_id: i64) -> Self {
        if page_id < 0 {
            panic!("PageId out of range")
        }

        Self(page_id as u32)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageId({})", self.0)
    }
}

impl From<PageId> for u32 {
    fn from(page_id: PageId) -> Self {
        page_id.0
    }
}

impl From<u32> for PageId {
    fn from(page_id: u32) -> Self {
        Self(page_id)
    }
}

impl From<i32> for PageId {
    fn from(page_id: i32) -> Self {
        if page_id < 0 {
            panic!("PageId out of range")
        }

        Self(page_id as u32)
    }
}

impl From<usize> for PageId {
    fn from(page_id: usize) -> Self {
        if page_id > u32::MAX as usize {
            panic!("PageId out of valid range. Got {}", page_id)
        }

        Self(page_id as u32)
    }
}

#[derive(Debug, Error, Clone)]
pub enum VisibilityConfigError {
    #[error("invalid configuration")]
    InvalidConfig,
}

/// Tunables for the visibility engine itself. Everything here is a safety
/// bound or a default, never a correctness knob: two processes with
/// different `VisibilityConfig`s must still agree on every visibility
/// verdict for the same inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, CopyGetters, Setters, TypedBuilder)]
#[getset(get_copy = "pub", set = "pub")]
pub struct VisibilityConfig {
    /// Upper bound on undo records traversed per call to the chain walker.
    /// Exists so a corrupt or cyclic chain fails loudly instead of hanging.
    #[builder(default = DEFAULT_MAX_CHAIN_WALK_STEPS)]
    max_chain_walk_steps: usize,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            max_chain_walk_steps: DEFAULT_MAX_CHAIN_WALK_STEPS,
        }
    }
}

impl VisibilityConfig {
    /// Load configuration from a given file and the environment, falling
    /// back to [`VisibilityConfig::default`] for anything unset.
    pub fn load_from_file_and_env(file_path: &str) -> Result<Self, VisibilityConfigError> {
        let builder = ConfigBuilder::<config::builder::DefaultState>::default()
            .set_default("max_chain_walk_steps", DEFAULT_MAX_CHAIN_WALK_STEPS as i64)
            .map_err(|_| VisibilityConfigError::InvalidConfig)?
            .add_source(File::new(file_path, FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("VISIBILITY").separator("__"))
            .build()
            .map_err(|_| VisibilityConfigError::InvalidConfig)?;

        builder
            .try_deserialize::<VisibilityConfig>()
            .map_err(|_| VisibilityConfigError::InvalidConfig)
    }
}
