//! State manager capability interfaces.
//!
//! Backends implement the subset of traits they support. The richest
//! capability is fixed when a [`Manager`] or [`Source`] handle is built, so
//! the protocol dispatches on a closed enum rather than per-call checks.

use crate::state::error::BackendError;
use crate::state::snapshot::{SnapshotMeta, State, StateFile};

/// Reads the latest snapshot payload.
pub trait Reader {
    /// Latest known payload. Must not fail; backends surface read errors
    /// from their own refresh step before this is reached.
    fn state(&self) -> State;
}

/// Accepts a new snapshot payload.
pub trait Writer {
    /// Store `state` as the latest payload. The backend may refuse it.
    fn write_state(&mut self, state: &State) -> Result<(), BackendError>;
}

/// Minimal read/write capability.
pub trait Transient: Reader + Writer {}

impl<T: Reader + Writer + ?Sized> Transient for T {}

/// Reports the metadata of the currently stored snapshot.
pub trait PersistentMeta {
    /// Must not fail.
    fn state_snapshot_meta(&self) -> SnapshotMeta;
}

/// Full-fidelity transfer of a snapshot with its metadata.
pub trait Migrator: PersistentMeta {
    /// The latest payload and its metadata as one bundle. Must not fail.
    fn state_for_migration(&self) -> StateFile;

    /// Replace the payload and metadata together, as if `write_state` were
    /// called followed by setting the metadata to match `file`.
    fn write_state_for_migration(&mut self, file: &StateFile) -> Result<(), BackendError>;
}

/// Reader with metadata.
pub trait MetaReader: Reader + PersistentMeta {}

impl<T: Reader + PersistentMeta + ?Sized> MetaReader for T {}

/// Reader with full-fidelity migration.
pub trait MigratorReader: Reader + Migrator {}

impl<T: Reader + Migrator + ?Sized> MigratorReader for T {}

/// Transient manager with metadata.
pub trait MetaTransient: Transient + PersistentMeta {}

impl<T: Transient + PersistentMeta + ?Sized> MetaTransient for T {}

/// Transient manager with full-fidelity migration.
pub trait MigratorTransient: Transient + Migrator {}

impl<T: Transient + Migrator + ?Sized> MigratorTransient for T {}

/// The richest capability a handle exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    /// Read-only; only a [`Source`] can carry this.
    Reader,
    Transient,
    PersistentMeta,
    Migrator,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::Reader => "reader",
            Capability::Transient => "transient",
            Capability::PersistentMeta => "persistent-meta",
            Capability::Migrator => "migrator",
        };
        f.write_str(name)
    }
}

/// Read/write handle on a state manager, tagged with its capability.
pub enum Manager<'a> {
    Transient(&'a mut dyn Transient),
    PersistentMeta(&'a mut dyn MetaTransient),
    Migrator(&'a mut dyn MigratorTransient),
}

impl<'a> Manager<'a> {
    pub fn transient<T: Transient>(mgr: &'a mut T) -> Self {
        Manager::Transient(mgr)
    }

    pub fn persistent_meta<T: MetaTransient>(mgr: &'a mut T) -> Self {
        Manager::PersistentMeta(mgr)
    }

    pub fn migrator<T: MigratorTransient>(mgr: &'a mut T) -> Self {
        Manager::Migrator(mgr)
    }

    pub fn capability(&self) -> Capability {
        match self {
            Manager::Transient(_) => Capability::Transient,
            Manager::PersistentMeta(_) => Capability::PersistentMeta,
            Manager::Migrator(_) => Capability::Migrator,
        }
    }

    /// Latest payload, whatever the capability.
    pub fn state(&self) -> State {
        match self {
            Manager::Transient(m) => m.state(),
            Manager::PersistentMeta(m) => m.state(),
            Manager::Migrator(m) => m.state(),
        }
    }

    /// Plain payload write, whatever the capability.
    pub fn write_state(&mut self, state: &State) -> Result<(), BackendError> {
        match self {
            Manager::Transient(m) => m.write_state(state),
            Manager::PersistentMeta(m) => m.write_state(state),
            Manager::Migrator(m) => m.write_state(state),
        }
    }
}

impl std::fmt::Debug for Manager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Manager").field(&self.capability()).finish()
    }
}

/// Read-only handle on a state manager, tagged with its capability.
pub enum Source<'a> {
    Reader(&'a dyn Reader),
    PersistentMeta(&'a dyn MetaReader),
    Migrator(&'a dyn MigratorReader),
}

impl<'a> Source<'a> {
    pub fn reader<T: Reader>(mgr: &'a T) -> Self {
        Source::Reader(mgr)
    }

    pub fn persistent_meta<T: MetaReader>(mgr: &'a T) -> Self {
        Source::PersistentMeta(mgr)
    }

    pub fn migrator<T: MigratorReader>(mgr: &'a T) -> Self {
        Source::Migrator(mgr)
    }

    pub fn capability(&self) -> Capability {
        match self {
            Source::Reader(_) => Capability::Reader,
            Source::PersistentMeta(_) => Capability::PersistentMeta,
            Source::Migrator(_) => Capability::Migrator,
        }
    }
}

impl std::fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Source").field(&self.capability()).finish()
    }
}

/// A concrete backend that knows its own capability.
pub trait StateBackend {
    /// Read/write handle at the richest capability this backend supports.
    fn manager(&mut self) -> Manager<'_>;

    /// Read-only handle at the richest capability this backend supports.
    fn source(&self) -> Source<'_>;
}
