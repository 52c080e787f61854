//! In-memory state managers.

use log::debug;

use crate::state::error::BackendError;
use crate::state::manager::{
    Manager, Migrator, PersistentMeta, Reader, Source, StateBackend, Writer,
};
use crate::state::snapshot::{new_lineage, SnapshotMeta, State, StateFile};

/// Holds a payload and nothing else. No lineage, no serial.
#[derive(Debug, Clone, Default)]
pub struct TransientMemory {
    state: State,
}

impl TransientMemory {
    pub fn new(state: State) -> Self {
        Self { state }
    }
}

impl Reader for TransientMemory {
    fn state(&self) -> State {
        self.state.clone()
    }
}

impl Writer for TransientMemory {
    fn write_state(&mut self, state: &State) -> Result<(), BackendError> {
        self.state = state.clone();
        Ok(())
    }
}

impl StateBackend for TransientMemory {
    fn manager(&mut self) -> Manager<'_> {
        Manager::transient(self)
    }

    fn source(&self) -> Source<'_> {
        Source::reader(self)
    }
}

/// Holds a full bundle and tracks lineage and serial across writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    file: StateFile,
}

impl MemoryState {
    /// An empty manager with no lineage recorded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager already holding `file`.
    pub fn with_file(file: StateFile) -> Self {
        Self { file }
    }

    /// The stored bundle.
    pub fn file(&self) -> &StateFile {
        &self.file
    }
}

/// Apply a plain payload write to `file`, assigning a lineage if none is
/// recorded and bumping the serial only when the payload changes.
///
/// Returns false if the payload was unchanged and nothing was updated.
pub(crate) fn apply_write(file: &mut StateFile, state: &State) -> bool {
    let changed = !file.state.content_eq(state);
    if file.lineage.is_empty() {
        file.lineage = new_lineage();
        debug!("Assigned new lineage {:?}", file.lineage);
    } else if !changed {
        return false;
    }
    if changed {
        file.serial += 1;
    }
    file.state = state.clone();
    true
}

impl Reader for MemoryState {
    fn state(&self) -> State {
        self.file.state.clone()
    }
}

impl Writer for MemoryState {
    fn write_state(&mut self, state: &State) -> Result<(), BackendError> {
        apply_write(&mut self.file, state);
        Ok(())
    }
}

impl PersistentMeta for MemoryState {
    fn state_snapshot_meta(&self) -> SnapshotMeta {
        self.file.meta()
    }
}

impl Migrator for MemoryState {
    fn state_for_migration(&self) -> StateFile {
        self.file.clone()
    }

    fn write_state_for_migration(&mut self, file: &StateFile) -> Result<(), BackendError> {
        self.file = file.clone();
        Ok(())
    }
}

impl StateBackend for MemoryState {
    fn manager(&mut self) -> Manager<'_> {
        Manager::migrator(self)
    }

    fn source(&self) -> Source<'_> {
        Source::migrator(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::manager::Capability;
    use serde_json::json;

    #[test]
    fn test_transient_memory_has_no_metadata() {
        let mut mem = TransientMemory::default();
        mem.write_state(&State::new(json!({"a": 1}))).unwrap();
        assert_eq!(mem.state().as_value(), &json!({"a": 1}));
        assert_eq!(mem.manager().capability(), Capability::Transient);
        assert_eq!(mem.source().capability(), Capability::Reader);
    }

    #[test]
    fn test_first_write_assigns_lineage() {
        let mut mem = MemoryState::new();
        assert!(!mem.state_snapshot_meta().has_lineage());

        mem.write_state(&State::new(json!({"a": 1}))).unwrap();
        let meta = mem.state_snapshot_meta();
        assert!(meta.has_lineage());
        assert_eq!(meta.serial, 1);
    }

    #[test]
    fn test_serial_only_moves_on_change() {
        let mut mem = MemoryState::with_file(StateFile::new(State::new(json!({"a": 1})), "lin", 4));

        mem.write_state(&State::new(json!({"a": 1}))).unwrap();
        assert_eq!(mem.state_snapshot_meta(), SnapshotMeta::new("lin", 4));

        mem.write_state(&State::new(json!({"a": 2}))).unwrap();
        assert_eq!(mem.state_snapshot_meta(), SnapshotMeta::new("lin", 5));
    }

    #[test]
    fn test_migration_write_stores_bundle_exactly() {
        let mut mem = MemoryState::with_file(StateFile::new(State::empty(), "old", 10));
        mem.write_state_for_migration(&StateFile::new(State::new(json!(1)), "new", 2))
            .unwrap();
        assert_eq!(mem.state_for_migration().meta(), SnapshotMeta::new("new", 2));
        assert_eq!(mem.manager().capability(), Capability::Migrator);
    }
}
