//! Machinery fleet editor

use tracing::info;

use super::{optional_text, require_non_negative, require_text};
use crate::models::Machine;
use crate::store::FarmStore;
use crate::{uuid_utils, Error, Result};

/// Shown in place of a machine that no longer exists
pub const UNKNOWN_MACHINE_LABEL: &str = "Unknown Machine";

/// Input for [`MachinesEditor::create`]
#[derive(Debug, Clone, Default)]
pub struct NewMachine {
    pub manufacturer: String,
    pub model: String,
    pub machine_type: String,
}

/// Editable machine attributes; replaces all of them at once
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineDetails {
    pub manufacturer: String,
    pub model: String,
    pub license_plate: Option<String>,
    pub horsepower: Option<f64>,
    pub year: Option<i32>,
    pub usage: Option<String>,
    pub fuel_type: Option<String>,
}

impl From<&Machine> for MachineDetails {
    fn from(machine: &Machine) -> Self {
        Self {
            manufacturer: machine.manufacturer.clone(),
            model: machine.model.clone(),
            license_plate: machine.license_plate.clone(),
            horsepower: machine.horsepower,
            year: machine.year,
            usage: machine.usage.clone(),
            fuel_type: machine.fuel_type.clone(),
        }
    }
}

pub struct MachinesEditor<'a> {
    store: &'a FarmStore,
}

impl<'a> MachinesEditor<'a> {
    pub fn new(store: &'a FarmStore) -> Self {
        Self { store }
    }

    /// Append a new machine. The type must be in the current taxonomy.
    pub fn create(&self, new: NewMachine) -> Result<Machine> {
        let manufacturer = require_text(&new.manufacturer, "Manufacturer")?;
        let model = require_text(&new.model, "Model")?;
        let machine_type = require_text(&new.machine_type, "Machine type")?;

        if !self.store.machine_types().get().contains(&machine_type) {
            return Err(Error::InvalidInput(format!(
                "Unknown machine type '{}'",
                machine_type
            )));
        }

        let machine = Machine {
            id: uuid_utils::new_record_id(),
            name: Machine::compose_name(&manufacturer, &model),
            manufacturer,
            model,
            machine_type,
            horsepower: None,
            license_plate: None,
            year: None,
            usage: None,
            fuel_type: None,
        };

        self.store.machines().update(|machines| machines.push(machine.clone()));
        info!(id = %machine.id, name = %machine.name, machine_type = %machine.machine_type, "Machine added");
        Ok(machine)
    }

    /// Replace the editable attributes of `id` in place, recomputing its name
    pub fn update_details(&self, id: &str, details: MachineDetails) -> Result<Machine> {
        let manufacturer = require_text(&details.manufacturer, "Manufacturer")?;
        let model = require_text(&details.model, "Model")?;
        let horsepower = details
            .horsepower
            .map(|hp| require_non_negative(hp, "Horsepower"))
            .transpose()?;

        let license_plate = optional_text(details.license_plate);
        let usage = optional_text(details.usage);
        let fuel_type = optional_text(details.fuel_type);

        let updated = self.store.machines().try_update(|machines| {
            let machine = machines.iter_mut().find(|m| m.id == id)?;
            machine.name = Machine::compose_name(&manufacturer, &model);
            machine.manufacturer = manufacturer;
            machine.model = model;
            machine.license_plate = license_plate;
            machine.horsepower = horsepower;
            machine.year = details.year;
            machine.usage = usage;
            machine.fuel_type = fuel_type;
            Some(machine.clone())
        });

        match updated {
            Some(machine) => {
                info!(id = %machine.id, name = %machine.name, "Machine details updated");
                Ok(machine)
            }
            None => Err(Error::NotFound(format!("Machine {}", id))),
        }
    }

    pub fn list(&self) -> Vec<Machine> {
        self.store.machines().get()
    }

    pub fn get(&self, id: &str) -> Option<Machine> {
        self.list().into_iter().find(|m| m.id == id)
    }

    /// Remove by id. Repair logs pointing at the machine are left as they are.
    pub fn delete(&self, id: &str) -> bool {
        let removed = self.store.machines().try_update(|machines| {
            let index = machines.iter().position(|m| m.id == id)?;
            Some(machines.remove(index))
        });

        match removed {
            Some(machine) => {
                info!(id = %machine.id, name = %machine.name, "Machine removed");
                true
            }
            None => false,
        }
    }

    pub fn by_type(&self, machine_type: &str) -> Vec<Machine> {
        self.list()
            .into_iter()
            .filter(|m| m.machine_type == machine_type)
            .collect()
    }

    /// Machine count per type label, in first-seen order
    pub fn count_by_type(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for machine in self.list() {
            match counts.iter_mut().find(|(t, _)| *t == machine.machine_type) {
                Some((_, count)) => *count += 1,
                None => counts.push((machine.machine_type, 1)),
            }
        }
        counts
    }

    /// Sum of known horsepower ratings
    pub fn total_horsepower(&self) -> f64 {
        self.list().iter().filter_map(|m| m.horsepower).sum()
    }

    /// Machine name for a soft reference, or the placeholder label
    pub fn display_name(&self, id: &str) -> String {
        self.get(id)
            .map(|m| m.name)
            .unwrap_or_else(|| UNKNOWN_MACHINE_LABEL.to_string())
    }
}
