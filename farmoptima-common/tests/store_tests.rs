//! Persisted store integration tests against the file backend

use farmoptima_common::editors::{NewField, NewMachine};
use farmoptima_common::events::StoreEvent;
use farmoptima_common::models::default_machine_types;
use farmoptima_common::store::SlotKey;
use farmoptima_common::FarmStore;
use tempfile::TempDir;

#[test]
fn test_records_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();

    let (field_id, machine_id) = {
        let store = FarmStore::open(temp_dir.path()).unwrap();
        let field = store
            .field_editor()
            .create(NewField {
                name: "Hill".to_string(),
                acres: 22.0,
                crop_type: Some("Wheat".to_string()),
            })
            .unwrap();
        let machine = store
            .machine_editor()
            .create(NewMachine {
                manufacturer: "Polaris".to_string(),
                model: "Ranger".to_string(),
                machine_type: "ATV".to_string(),
            })
            .unwrap();
        (field.id, machine.id)
    };

    let store = FarmStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.field_editor().display_name(&field_id), "Hill");
    assert_eq!(store.machine_editor().display_name(&machine_id), "Polaris Ranger");
}

#[test]
fn test_corrupt_slot_file_falls_back_and_is_overwritten_on_write() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("farm_fields.json"), "\u{0}\u{1}garbage").unwrap();
    std::fs::write(temp_dir.path().join("farm_machine_types.json"), "42").unwrap();

    let store = FarmStore::open(temp_dir.path()).unwrap();
    assert!(store.fields().get().is_empty());
    assert_eq!(store.machine_types().get(), default_machine_types());

    store
        .field_editor()
        .create(NewField {
            name: "Recovered".to_string(),
            acres: 1.0,
            crop_type: None,
        })
        .unwrap();

    let reopened = FarmStore::open(temp_dir.path()).unwrap();
    assert_eq!(reopened.fields().get().len(), 1);
}

#[test]
fn test_unwritable_data_folder_keeps_session_value() {
    let temp_dir = TempDir::new().unwrap();
    let store = FarmStore::open(temp_dir.path()).unwrap();

    // Pull the folder out from under the store; writes now fail silently
    temp_dir.close().unwrap();

    let field = store
        .field_editor()
        .create(NewField {
            name: "Volatile".to_string(),
            acres: 5.0,
            crop_type: None,
        })
        .unwrap();
    assert_eq!(store.field_editor().get(&field.id), Some(field));
}

#[test]
fn test_editor_writes_publish_events() {
    let store = FarmStore::in_memory();
    let mut rx = store.subscribe();

    store
        .field_editor()
        .create(NewField {
            name: "Evented".to_string(),
            acres: 2.0,
            crop_type: None,
        })
        .unwrap();

    match rx.try_recv().unwrap() {
        StoreEvent::SlotChanged { key, .. } => assert_eq!(key, SlotKey::Fields),
        other => panic!("unexpected event {:?}", other),
    }

    // A rejected no-op publishes nothing
    assert!(!store.field_editor().delete("missing"));
    assert!(rx.try_recv().is_err());
}
