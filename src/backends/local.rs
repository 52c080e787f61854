//! Local filesystem state manager.
//!
//! Stores one bundle per file. Every accepted write is persisted at once, and
//! before the first overwrite made through an instance the bundle previously
//! read from disk is copied to a backup file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::backends::memory::apply_write;
use crate::state::error::{BackendError, Result};
use crate::state::manager::{
    Manager, Migrator, PersistentMeta, Reader, Source, StateBackend, Writer,
};
use crate::state::snapshot::{SnapshotMeta, State, StateFile};
use crate::state::statefile;

/// Appended to the state path to form the default backup path.
pub const DEFAULT_BACKUP_EXTENSION: &str = ".backup";

/// Where a [`LocalState`] keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStateOptions {
    /// Path of the state file.
    pub path: PathBuf,

    /// Path of the backup file. `None` disables backups.
    pub backup_path: Option<PathBuf>,
}

impl LocalStateOptions {
    /// Options for `path`, backing up to `<path>.backup`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut backup = path.as_os_str().to_os_string();
        backup.push(DEFAULT_BACKUP_EXTENSION);
        Self {
            path,
            backup_path: Some(PathBuf::from(backup)),
        }
    }

    pub fn with_backup(mut self, backup_path: impl Into<PathBuf>) -> Self {
        self.backup_path = Some(backup_path.into());
        self
    }

    pub fn without_backup(mut self) -> Self {
        self.backup_path = None;
        self
    }
}

/// A state manager backed by a bundle file on the local filesystem.
#[derive(Debug)]
pub struct LocalState {
    options: LocalStateOptions,
    /// Current bundle, including writes made through this instance.
    file: StateFile,
    /// Bundle as last read from disk, if the file existed.
    read_file: Option<StateFile>,
    backed_up: bool,
    persisted_at: Option<DateTime<Utc>>,
}

impl LocalState {
    /// Open the state at `options.path`, reading it if it exists.
    ///
    /// Read and decode failures are reported here so that the reader
    /// methods never have to fail.
    pub fn open(options: LocalStateOptions) -> Result<Self> {
        let mut local = Self {
            options,
            file: StateFile::default(),
            read_file: None,
            backed_up: false,
            persisted_at: None,
        };
        local.refresh()?;
        Ok(local)
    }

    /// Re-read the state file from disk, discarding the in-memory copy.
    pub fn refresh(&mut self) -> Result<()> {
        let path = &self.options.path;
        if path.exists() {
            let file = statefile::read_path(path)?;
            debug!(
                "Read state {} (lineage {:?}, serial {})",
                path.display(),
                file.lineage,
                file.serial
            );
            self.file = file.clone();
            self.read_file = Some(file);
        } else {
            debug!("No state at {}; starting empty", path.display());
            self.file = StateFile::default();
            self.read_file = None;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.options.path
    }

    pub fn backup_path(&self) -> Option<&Path> {
        self.options.backup_path.as_deref()
    }

    /// The current bundle.
    pub fn file(&self) -> &StateFile {
        &self.file
    }

    /// When this instance last wrote the state file.
    pub fn persisted_at(&self) -> Option<DateTime<Utc>> {
        self.persisted_at
    }

    fn persist(&mut self, file: StateFile) -> Result<()> {
        if !self.backed_up {
            if let (Some(backup_path), Some(previous)) =
                (&self.options.backup_path, &self.read_file)
            {
                statefile::write_path(backup_path, previous)?;
                info!(
                    "Backed up state serial {} to {}",
                    previous.serial,
                    backup_path.display()
                );
            }
            self.backed_up = true;
        }

        statefile::write_path(&self.options.path, &file)?;
        let now = Utc::now();
        debug!(
            "Wrote state {} (lineage {:?}, serial {}) at {}",
            self.options.path.display(),
            file.lineage,
            file.serial,
            now.to_rfc3339()
        );
        self.file = file;
        self.persisted_at = Some(now);
        Ok(())
    }
}

impl Reader for LocalState {
    fn state(&self) -> State {
        self.file.state.clone()
    }
}

impl Writer for LocalState {
    fn write_state(&mut self, state: &State) -> std::result::Result<(), BackendError> {
        let mut next = self.file.clone();
        if !apply_write(&mut next, state) {
            debug!("State unchanged; skipping write to {}", self.options.path.display());
            return Ok(());
        }
        self.persist(next).map_err(Into::into)
    }
}

impl PersistentMeta for LocalState {
    fn state_snapshot_meta(&self) -> SnapshotMeta {
        self.file.meta()
    }
}

impl Migrator for LocalState {
    fn state_for_migration(&self) -> StateFile {
        self.file.clone()
    }

    fn write_state_for_migration(
        &mut self,
        file: &StateFile,
    ) -> std::result::Result<(), BackendError> {
        self.persist(file.clone()).map_err(Into::into)
    }
}

impl StateBackend for LocalState {
    fn manager(&mut self) -> Manager<'_> {
        Manager::migrator(self)
    }

    fn source(&self) -> Source<'_> {
        Source::migrator(self)
    }
}
