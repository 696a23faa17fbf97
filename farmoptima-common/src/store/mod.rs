//! Persisted farm store
//!
//! [`FarmStore`] owns one [`Slot`] per collection plus the [`EventBus`] they
//! publish on. It is created once and passed explicitly to every consumer.

mod backend;
mod slot;

pub use backend::{FileBackend, MemoryBackend, StorageBackend, StorageError};
pub use slot::Slot;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::editors::{FieldsEditor, MachineTypesEditor, MachinesEditor, RepairsEditor, WorksEditor};
use crate::events::{EventBus, StoreEvent, DEFAULT_EVENT_CAPACITY};
use crate::models::{default_machine_types, Field, FieldWork, Machine, MachineRepair};
use crate::{time, Result};

/// Identifies one persisted collection
///
/// Serializes as the snapshot document's top-level key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotKey {
    Fields,
    Machines,
    Works,
    Repairs,
    MachineTypes,
}

impl SlotKey {
    /// Every slot, in snapshot document order
    pub const ALL: [SlotKey; 5] = [
        SlotKey::Fields,
        SlotKey::Machines,
        SlotKey::Works,
        SlotKey::Repairs,
        SlotKey::MachineTypes,
    ];

    /// Key under which the backend stores this slot
    pub fn storage_key(&self) -> &'static str {
        match self {
            SlotKey::Fields => "farm_fields",
            SlotKey::Machines => "farm_machines",
            SlotKey::Works => "farm_works",
            SlotKey::Repairs => "farm_repairs",
            SlotKey::MachineTypes => "farm_machine_types",
        }
    }

    /// Top-level key in snapshot documents
    pub fn snapshot_field(&self) -> &'static str {
        match self {
            SlotKey::Fields => "fields",
            SlotKey::Machines => "machines",
            SlotKey::Works => "works",
            SlotKey::Repairs => "repairs",
            SlotKey::MachineTypes => "machineTypes",
        }
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.snapshot_field())
    }
}

/// The five persisted collection slots and their event bus
pub struct FarmStore {
    fields: Slot<Vec<Field>>,
    machines: Slot<Vec<Machine>>,
    works: Slot<Vec<FieldWork>>,
    repairs: Slot<Vec<MachineRepair>>,
    machine_types: Slot<Vec<String>>,
    events: EventBus,
}

impl FarmStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        let events = EventBus::new(DEFAULT_EVENT_CAPACITY);
        Self {
            fields: Slot::new(SlotKey::Fields, backend.clone(), events.clone(), Vec::new()),
            machines: Slot::new(SlotKey::Machines, backend.clone(), events.clone(), Vec::new()),
            works: Slot::new(SlotKey::Works, backend.clone(), events.clone(), Vec::new()),
            repairs: Slot::new(SlotKey::Repairs, backend.clone(), events.clone(), Vec::new()),
            machine_types: Slot::new(
                SlotKey::MachineTypes,
                backend,
                events.clone(),
                default_machine_types(),
            ),
            events,
        }
    }

    /// File-backed store in `data_folder`, creating the folder if needed
    pub fn open(data_folder: &Path) -> Result<Self> {
        let backend = FileBackend::open(data_folder)?;
        info!("Farm store opened at {}", data_folder.display());
        Ok(Self::new(Arc::new(backend)))
    }

    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn fields(&self) -> &Slot<Vec<Field>> {
        &self.fields
    }

    pub fn machines(&self) -> &Slot<Vec<Machine>> {
        &self.machines
    }

    pub fn works(&self) -> &Slot<Vec<FieldWork>> {
        &self.works
    }

    pub fn repairs(&self) -> &Slot<Vec<MachineRepair>> {
        &self.repairs
    }

    pub fn machine_types(&self) -> &Slot<Vec<String>> {
        &self.machine_types
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn field_editor(&self) -> FieldsEditor<'_> {
        FieldsEditor::new(self)
    }

    pub fn machine_editor(&self) -> MachinesEditor<'_> {
        MachinesEditor::new(self)
    }

    pub fn machine_type_editor(&self) -> MachineTypesEditor<'_> {
        MachineTypesEditor::new(self)
    }

    pub fn work_editor(&self) -> WorksEditor<'_> {
        WorksEditor::new(self)
    }

    pub fn repair_editor(&self) -> RepairsEditor<'_> {
        RepairsEditor::new(self)
    }

    /// Tell every view that `keys` were replaced
    pub fn broadcast_invalidation(&self, keys: Vec<SlotKey>) {
        self.events.emit_lossy(StoreEvent::StoreInvalidated {
            keys,
            timestamp: time::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fresh_store_defaults() {
        let store = FarmStore::in_memory();
        assert!(store.fields().get().is_empty());
        assert!(store.machines().get().is_empty());
        assert!(store.works().get().is_empty());
        assert!(store.repairs().get().is_empty());
        assert_eq!(store.machine_types().get(), default_machine_types());
    }

    #[test]
    fn test_storage_keys_are_distinct() {
        let mut keys: Vec<&str> = SlotKey::ALL.iter().map(|k| k.storage_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn test_slot_key_serializes_as_snapshot_field() {
        for key in SlotKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.snapshot_field()));
        }
    }

    #[test]
    fn test_open_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("farm");

        {
            let store = FarmStore::open(&data).unwrap();
            store.machine_types().set(vec!["Drone".to_string()]);
        }

        let store = FarmStore::open(&data).unwrap();
        assert_eq!(store.machine_types().get(), vec!["Drone".to_string()]);
        assert!(data.join("farm_machine_types.json").exists());
    }

    #[test]
    fn test_writes_publish_slot_changed() {
        let store = FarmStore::in_memory();
        let mut rx = store.subscribe();

        store.machine_types().set(Vec::new());
        let event = rx.try_recv().unwrap();
        assert!(event.affects(SlotKey::MachineTypes));
        assert!(!event.affects(SlotKey::Fields));
    }

    #[test]
    fn test_broadcast_invalidation() {
        let store = FarmStore::in_memory();
        let mut rx = store.subscribe();

        store.broadcast_invalidation(vec![SlotKey::Fields, SlotKey::Works]);
        match rx.try_recv().unwrap() {
            StoreEvent::StoreInvalidated { keys, .. } => {
                assert_eq!(keys, vec![SlotKey::Fields, SlotKey::Works]);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
