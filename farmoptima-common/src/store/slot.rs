//! Persisted slot: one lazily loaded, write-through value per key

use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::backend::StorageBackend;
use super::SlotKey;
use crate::events::{EventBus, StoreEvent};
use crate::time;

/// A typed collection slot mirrored to a [`StorageBackend`]
///
/// - The first read loads the persisted value; absent, unreadable or
///   corrupt data yields the default instead of an error.
/// - Every write updates memory first, publishes [`StoreEvent::SlotChanged`],
///   then mirrors the serialized value to the backend. Write failures are
///   logged and swallowed; the in-memory value stays authoritative.
pub struct Slot<T> {
    key: SlotKey,
    backend: Arc<dyn StorageBackend>,
    events: EventBus,
    default: T,
    value: RwLock<Option<T>>,
}

impl<T> Slot<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    pub fn new(key: SlotKey, backend: Arc<dyn StorageBackend>, events: EventBus, default: T) -> Self {
        Self {
            key,
            backend,
            events,
            default,
            value: RwLock::new(None),
        }
    }

    /// Current value, loading it on first access
    pub fn get(&self) -> T {
        {
            let guard = self.value.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(value) = guard.as_ref() {
                return value.clone();
            }
        }

        let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
        guard.get_or_insert_with(|| self.load()).clone()
    }

    /// Replace the value wholesale
    pub fn set(&self, value: T) {
        self.replace(value);
        self.publish_change();
    }

    /// Mutate the value in place; always persists
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
            let value = guard.get_or_insert_with(|| self.load());
            let result = f(value);
            self.persist(value);
            result
        };
        self.publish_change();
        result
    }

    /// Mutate the value in place; persists only when `f` returns `Some`
    ///
    /// `f` must leave the value untouched when it returns `None`.
    pub fn try_update<R>(&self, f: impl FnOnce(&mut T) -> Option<R>) -> Option<R> {
        let result = {
            let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
            let value = guard.get_or_insert_with(|| self.load());
            let result = f(value);
            if result.is_some() {
                self.persist(value);
            }
            result
        };
        if result.is_some() {
            self.publish_change();
        }
        result
    }

    /// Replace and persist without publishing. Import publishes one
    /// invalidation for all replaced slots instead.
    pub(crate) fn replace(&self, value: T) {
        let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
        self.persist(&value);
        *guard = Some(value);
    }

    fn publish_change(&self) {
        self.events.emit_lossy(StoreEvent::SlotChanged {
            key: self.key,
            timestamp: time::now(),
        });
    }

    fn load(&self) -> T {
        let storage_key = self.key.storage_key();
        match self.backend.read(storage_key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(slot = storage_key, "Loaded persisted slot");
                    value
                }
                Err(e) => {
                    warn!(slot = storage_key, error = %e, "Persisted slot is corrupt, using default");
                    self.default.clone()
                }
            },
            Ok(None) => {
                debug!(slot = storage_key, "No persisted value, using default");
                self.default.clone()
            }
            Err(e) => {
                warn!(slot = storage_key, error = %e, "Persisted slot unreadable, using default");
                self.default.clone()
            }
        }
    }

    fn persist(&self, value: &T) {
        let storage_key = self.key.storage_key();
        let serialized = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                warn!(slot = storage_key, error = %e, "Failed to serialize slot, keeping in-memory value");
                return;
            }
        };

        if let Err(e) = self.backend.write(storage_key, &serialized) {
            warn!(slot = storage_key, error = %e, "Failed to persist slot, keeping in-memory value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::backend::{MemoryBackend, StorageError};

    fn slot_with(backend: Arc<dyn StorageBackend>) -> Slot<Vec<String>> {
        Slot::new(
            SlotKey::MachineTypes,
            backend,
            EventBus::new(10),
            vec!["Tractor".to_string()],
        )
    }

    struct UnavailableBackend;

    impl StorageBackend for UnavailableBackend {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
    }

    #[test]
    fn test_get_returns_default_when_absent() {
        let backend = Arc::new(MemoryBackend::new());
        let slot = slot_with(backend.clone());

        assert_eq!(slot.get(), vec!["Tractor".to_string()]);
        // Reading alone never writes
        assert!(backend.is_empty());
    }

    #[test]
    fn test_get_loads_persisted_value() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("farm_machine_types", r#"["Combine","ATV"]"#).unwrap();

        let slot = slot_with(backend);
        assert_eq!(slot.get(), vec!["Combine".to_string(), "ATV".to_string()]);
    }

    #[test]
    fn test_corrupt_value_falls_back_to_default() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("farm_machine_types", "{not json").unwrap();

        let slot = slot_with(backend);
        assert_eq!(slot.get(), vec!["Tractor".to_string()]);
    }

    #[test]
    fn test_wrong_shape_value_falls_back_to_default() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("farm_machine_types", r#"{"a":1}"#).unwrap();

        let slot = slot_with(backend);
        assert_eq!(slot.get(), vec!["Tractor".to_string()]);
    }

    #[test]
    fn test_set_mirrors_to_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let slot = slot_with(backend.clone());

        slot.set(vec!["Planter".to_string()]);
        assert_eq!(
            backend.read("farm_machine_types").unwrap().as_deref(),
            Some(r#"["Planter"]"#)
        );
    }

    #[test]
    fn test_unavailable_backend_keeps_in_memory_value() {
        let slot = slot_with(Arc::new(UnavailableBackend));

        assert_eq!(slot.get(), vec!["Tractor".to_string()]);
        slot.update(|types| types.push("Truck".to_string()));
        assert_eq!(slot.get(), vec!["Tractor".to_string(), "Truck".to_string()]);
    }

    #[test]
    fn test_quota_exceeded_write_is_swallowed() {
        let backend = Arc::new(MemoryBackend::with_quota(4));
        let slot = slot_with(backend.clone());

        slot.set(vec!["Sprayer".to_string()]);
        assert_eq!(slot.get(), vec!["Sprayer".to_string()]);
        assert!(backend.read("farm_machine_types").unwrap().is_none());
    }

    #[test]
    fn test_try_update_none_does_not_persist_or_publish() {
        let backend = Arc::new(MemoryBackend::new());
        let events = EventBus::new(10);
        let mut rx = events.subscribe();
        let slot: Slot<Vec<String>> =
            Slot::new(SlotKey::MachineTypes, backend.clone(), events, Vec::new());

        let result: Option<()> = slot.try_update(|_| None);
        assert!(result.is_none());
        assert!(backend.is_empty());
        assert!(rx.try_recv().is_err());

        slot.try_update(|types| {
            types.push("Loader".to_string());
            Some(())
        });
        assert!(!backend.is_empty());
        assert_eq!(rx.try_recv().unwrap().event_type(), "SlotChanged");
    }
}
