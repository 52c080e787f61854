//! Snapshot migration, import and export between state managers.
//!
//! None of these functions lock. If the managers involved support locking,
//! the caller must hold a lock on each of them for the duration of the call
//! and release it on every exit path.
//!
//! For managers that persist separately from writing, persisting after a
//! successful write remains the caller's job, as with a plain `write_state`.

use log::{debug, info};

use crate::state::error::{BackendError, ImportError};
use crate::state::manager::{Manager, Source};
use crate::state::snapshot::StateFile;

/// Write the latest snapshot of `src` into `dst`.
///
/// When both managers are [`Migrator`](crate::state::Migrator)s the bundle is
/// copied with its lineage and serial intact. Otherwise only the payload is
/// copied and `dst` assigns whatever metadata it assigns on a normal write.
///
/// A refusal or failure from `dst` is returned exactly as reported.
pub fn migrate(dst: &mut Manager<'_>, src: &Manager<'_>) -> Result<(), BackendError> {
    if let (Manager::Migrator(dst_m), Manager::Migrator(src_m)) = (&mut *dst, src) {
        let file = src_m.state_for_migration();
        debug!(
            "Full-fidelity migration: lineage {:?} serial {}",
            file.lineage, file.serial
        );
        return dst_m.write_state_for_migration(&file);
    }

    debug!(
        "Payload-only migration from {} into {}; serial and lineage are not preserved",
        src.capability(),
        dst.capability()
    );
    let state = src.state();
    dst.write_state(&state)
}

/// Load `file` into `mgr`, keeping its lineage and serial when `mgr`
/// supports metadata.
///
/// Unless `force` is set, a Migrator target is first checked against its
/// current metadata: an unrelated lineage, an older serial, or a different
/// payload under the same serial are refused. Re-importing exactly what is
/// stored is a no-op. The checks are skipped when either lineage is empty.
///
/// `force` has no effect on managers without metadata, and a backend may
/// still refuse a forced write on its own terms.
pub fn import(file: &StateFile, mgr: &mut Manager<'_>, force: bool) -> Result<(), ImportError> {
    let target = match mgr {
        Manager::Migrator(target) => target,
        plain => {
            debug!(
                "Importing into {} manager as a plain write; metadata is dropped",
                plain.capability()
            );
            return plain.write_state(&file.state).map_err(ImportError::Backend);
        }
    };

    let current = target.state_snapshot_meta();
    if !file.lineage.is_empty() && current.has_lineage() && !force {
        if file.lineage != current.lineage {
            return Err(ImportError::LineageConflict {
                imported: file.lineage.clone(),
                current: current.lineage,
            });
        }

        if file.serial == current.serial {
            if file.state.content_eq(&target.state()) {
                info!(
                    "State with lineage {:?} serial {} is already stored; nothing to import",
                    current.lineage, current.serial
                );
                return Ok(());
            }
            return Err(ImportError::SameSerialConflict {
                lineage: current.lineage,
                serial: current.serial,
            });
        }

        if file.serial < current.serial {
            return Err(ImportError::StaleSerial {
                imported: file.serial,
                current: current.serial,
            });
        }
    } else if force {
        debug!(
            "Forced import of lineage {:?} serial {} over lineage {:?} serial {}",
            file.lineage, file.serial, current.lineage, current.serial
        );
    }

    target
        .write_state_for_migration(file)
        .map_err(ImportError::Backend)
}

/// Read the latest snapshot out of `source`, with metadata where available.
///
/// A plain reader yields an empty lineage and serial 0. For managers that
/// refresh from persistent storage, refreshing first is the caller's job.
pub fn export(source: &Source<'_>) -> StateFile {
    match source {
        Source::Migrator(m) => m.state_for_migration(),
        Source::PersistentMeta(m) => {
            let state = m.state();
            let meta = m.state_snapshot_meta();
            StateFile::new(state, meta.lineage, meta.serial)
        }
        Source::Reader(m) => StateFile::new(m.state(), "", 0),
    }
}
