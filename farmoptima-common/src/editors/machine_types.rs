//! Machine type taxonomy editor (ordered set of labels)

use tracing::info;

use crate::store::FarmStore;

pub struct MachineTypesEditor<'a> {
    store: &'a FarmStore,
}

impl<'a> MachineTypesEditor<'a> {
    pub fn new(store: &'a FarmStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<String> {
        self.store.machine_types().get()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.list().iter().position(|t| t == name)
    }

    /// Append a label. Blank names and duplicates are ignored (returns false).
    pub fn add(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        let added = self
            .store
            .machine_types()
            .try_update(|types| {
                if types.iter().any(|t| t == name) {
                    return None;
                }
                types.push(name.to_string());
                Some(())
            })
            .is_some();

        if added {
            info!(machine_type = name, "Machine type added");
        }
        added
    }

    /// Remove a label. Machines already using it keep it.
    pub fn remove(&self, name: &str) -> bool {
        let removed = self
            .store
            .machine_types()
            .try_update(|types| {
                let index = types.iter().position(|t| t == name)?;
                Some(types.remove(index))
            })
            .is_some();

        if removed {
            info!(machine_type = name, "Machine type removed");
        }
        removed
    }

    /// Swap with the previous entry; no-op for the first entry
    pub fn move_up(&self, index: usize) -> bool {
        self.store
            .machine_types()
            .try_update(|types| {
                if index == 0 || index >= types.len() {
                    return None;
                }
                types.swap(index - 1, index);
                Some(())
            })
            .is_some()
    }

    /// Swap with the next entry; no-op for the last entry
    pub fn move_down(&self, index: usize) -> bool {
        self.store
            .machine_types()
            .try_update(|types| {
                if index + 1 >= types.len() {
                    return None;
                }
                types.swap(index, index + 1);
                Some(())
            })
            .is_some()
    }
}
