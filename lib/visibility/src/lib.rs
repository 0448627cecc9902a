//! A tuple visibility engine for an undo-log-based, multi-version table
//! storage format: given a tuple's on-page header plus a transaction
//! oracle, an undo store, and a page's transaction-slot metadata, decides
//! which version of a row (if any) a given reader may observe.
//!
//! Only the main heap's latest version lives on the page; every prior
//! version is reconstructed on demand by walking the page's undo chain
//! ([`walker`]), re-rooting across transaction-slot reuse as needed
//! ([`resolver`]). The five predicates in [`predicates`] combine that
//! reconstruction with a snapshot, a command id, or a bare horizon xid to
//! produce a verdict; nothing in this crate writes undo, rolls back an
//! aborted transaction, or reclaims space.

#![allow(dead_code)]

pub mod context;
pub mod error;
pub mod predicates;
pub mod resolver;
pub mod state;
#[cfg(test)]
mod testing;
pub mod walker;

pub use context::VisibilityContext;
pub use error::VisibilityError;
pub use predicates::{
    is_surely_dead, satisfies_any, satisfies_dirty, satisfies_mvcc, satisfies_oldest_xmin,
    satisfies_update, OldestXminOutcome, OldestXminVerdict, UpdateOutcome, UpdateVerdict,
};
