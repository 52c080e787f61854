//! State manager implementations.
//!
//! The protocol in [`crate::state::migrate`] works with any backend that
//! implements the capability traits; these are the ones shipped with the
//! crate.

pub mod local;
pub mod memory;

pub use local::{LocalState, LocalStateOptions, DEFAULT_BACKUP_EXTENSION};
pub use memory::{MemoryState, TransientMemory};
