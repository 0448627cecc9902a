#![allow(dead_code)]

pub mod oracle;
pub mod snapshot;
pub mod transaction;

pub use oracle::*;
pub use snapshot::*;
pub use transaction::*;
