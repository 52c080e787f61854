//! Snapshift - State Snapshot Migration
//!
//! Moves a single "current state" snapshot between state managers while
//! keeping its versioning envelope intact where possible:
//! - Migrate: copy the latest snapshot from one manager to another
//! - Import: load a bundle into a manager, refusing unsafe overwrites
//! - Export: read the latest snapshot out as a portable bundle
//!
//! # Architecture
//!
//! - `state`: data model, capability traits and the protocol itself
//! - `backends`: in-memory and local-file state managers
//! - `cli`: the `snapshift` command-line front end

pub mod backends;
pub mod cli;
pub mod state;

pub use state::{ImportError, Result, StateError};
