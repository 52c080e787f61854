//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::backends::{LocalState, LocalStateOptions};
use crate::state::{export, import, migrate, statefile};
use crate::state::{BackendError, ImportError, PersistentMeta, StateBackend, StateError};

fn open_state(options: LocalStateOptions) -> Result<LocalState> {
    let path = options.path.clone();
    LocalState::open(options)
        .with_context(|| format!("Failed to open state {}", path.display()))
}

/// Show the metadata of a state file.
pub fn show(path: &Path) -> Result<()> {
    info!("Showing state: {}", path.display());

    let local = open_state(LocalStateOptions::new(path).without_backup())?;
    let file = export(&local.source());

    println!("State: {}", path.display());
    if file.lineage.is_empty() {
        println!("Lineage: (none)");
    } else {
        println!("Lineage: {}", file.lineage);
    }
    println!("Serial: {}", file.serial);
    println!("Empty: {}", file.state.is_empty());
    println!("Digest: sha256:{}", file.state.digest());

    if let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) {
        let modified: DateTime<Utc> = modified.into();
        println!("Modified: {}", modified.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    Ok(())
}

/// Export a state file's latest snapshot to stdout or `out`.
pub fn pull(path: &Path, out: Option<&Path>) -> Result<()> {
    info!("Pulling state: {}", path.display());

    let local = open_state(LocalStateOptions::new(path).without_backup())?;
    let file = export(&local.source());

    match out {
        Some(out) => {
            statefile::write_path(out, &file)
                .with_context(|| format!("Failed to write bundle {}", out.display()))?;
            println!(
                "Pulled serial {} of {} into {}",
                file.serial,
                path.display(),
                out.display()
            );
        }
        None => statefile::write(io::stdout().lock(), &file)?,
    }

    Ok(())
}

/// Import a bundle into a state file.
pub fn push(bundle: &Path, options: LocalStateOptions, force: bool) -> Result<()> {
    info!(
        "Pushing {} into {}",
        bundle.display(),
        options.path.display()
    );

    let file = statefile::read_path(bundle)
        .with_context(|| format!("Failed to read bundle {}", bundle.display()))?;
    let mut local = open_state(options)?;

    if force {
        warn!("Forcing import: lineage and serial checks are skipped");
    }

    import(&file, &mut local.manager(), force)
        .with_context(|| format!("Failed to push {}", bundle.display()))?;

    if local.persisted_at().is_none() {
        println!("State already up to date at serial {}", file.serial);
    } else {
        let meta = local.state_snapshot_meta();
        println!(
            "Pushed lineage {} serial {} into {}",
            meta.lineage,
            meta.serial,
            local.path().display()
        );
    }

    Ok(())
}

/// Copy the latest snapshot of `from` into the state described by `to`.
pub fn migrate_state(from: &Path, to: LocalStateOptions) -> Result<()> {
    info!("Migrating {} to {}", from.display(), to.path.display());

    let mut src = open_state(LocalStateOptions::new(from).without_backup())?;
    let mut dst = open_state(to)?;

    let result = migrate(&mut dst.manager(), &src.manager());
    result
        .map_err(backend_error)
        .with_context(|| format!("Failed to write {}", dst.path().display()))?;

    let meta = dst.state_snapshot_meta();
    println!(
        "Migrated {} to {} (lineage {}, serial {})",
        from.display(),
        dst.path().display(),
        meta.lineage,
        meta.serial
    );

    Ok(())
}

/// Keep a backend's own `StateError` typed inside the `anyhow` chain.
fn backend_error(err: BackendError) -> anyhow::Error {
    match err.downcast::<StateError>() {
        Ok(state_err) => anyhow::Error::new(*state_err),
        Err(other) => anyhow!(other),
    }
}

/// Recovery hint for a failed command, if the cause is a known error.
pub fn recovery_suggestion(err: &anyhow::Error) -> Option<&'static str> {
    match err.downcast_ref::<ImportError>() {
        Some(ImportError::Backend(inner)) => inner
            .downcast_ref::<StateError>()
            .and_then(StateError::recovery_suggestion),
        Some(import_err) => import_err.recovery_suggestion(),
        None => err
            .chain()
            .find_map(|cause| cause.downcast_ref::<StateError>())
            .and_then(StateError::recovery_suggestion),
    }
}
