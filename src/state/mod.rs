//! State Snapshot Module
//!
//! Provides the snapshot data model, state manager capabilities, the
//! migrate/import/export protocol and the portable bundle format.

pub mod error;
pub mod manager;
pub mod migrate;
pub mod snapshot;
pub mod statefile;

pub use error::{BackendError, ImportError, Result, StateError};
pub use manager::{
    Capability, Manager, MetaReader, MetaTransient, Migrator, MigratorReader, MigratorTransient,
    PersistentMeta, Reader, Source, StateBackend, Transient, Writer,
};
pub use migrate::{export, import, migrate};
pub use snapshot::{new_lineage, SnapshotMeta, State, StateFile};
pub use statefile::STATE_FORMAT_VERSION;
