//! Maintenance and repair log editor

use chrono::NaiveDate;
use tracing::info;

use super::{require_date, require_non_negative, require_text};
use crate::models::MachineRepair;
use crate::store::FarmStore;
use crate::{time, uuid_utils, Result};

/// A repair counts as upcoming when its next due date is at most this many
/// days ahead (and not in the past)
pub const UPCOMING_WINDOW_DAYS: i64 = 14;

/// Input for [`RepairsEditor::create`]
#[derive(Debug, Clone, Default)]
pub struct NewRepair {
    pub machine_id: String,
    pub date: String,
    pub description: String,
    pub cost: Option<f64>,
    pub next_due_date: Option<String>,
}

pub struct RepairsEditor<'a> {
    store: &'a FarmStore,
}

impl<'a> RepairsEditor<'a> {
    pub fn new(store: &'a FarmStore) -> Self {
        Self { store }
    }

    /// Log a repair; newest entries come first.
    ///
    /// The machine id is not checked against the fleet.
    pub fn create(&self, new: NewRepair) -> Result<MachineRepair> {
        let next_due_date = match new.next_due_date.as_deref().map(str::trim) {
            Some(due) if !due.is_empty() => Some(require_date(due, "Next due date")?),
            _ => None,
        };

        let repair = MachineRepair {
            id: uuid_utils::new_record_id(),
            machine_id: require_text(&new.machine_id, "Machine")?,
            date: require_date(&new.date, "Date")?,
            description: require_text(&new.description, "Description")?,
            cost: new.cost.map(|c| require_non_negative(c, "Cost")).transpose()?,
            next_due_date,
        };

        self.store.repairs().update(|repairs| repairs.insert(0, repair.clone()));
        info!(id = %repair.id, machine_id = %repair.machine_id, cost = ?repair.cost, "Repair logged");
        Ok(repair)
    }

    pub fn list(&self) -> Vec<MachineRepair> {
        self.store.repairs().get()
    }

    pub fn delete(&self, id: &str) -> bool {
        let removed = self.store.repairs().try_update(|repairs| {
            let index = repairs.iter().position(|r| r.id == id)?;
            Some(repairs.remove(index))
        });

        if let Some(repair) = &removed {
            info!(id = %repair.id, "Repair removed");
        }
        removed.is_some()
    }

    /// Sum of recorded costs; entries without a cost count as zero
    pub fn total_cost(&self) -> f64 {
        self.list().iter().filter_map(|r| r.cost).sum()
    }

    /// Next due date falls within `[today, today + UPCOMING_WINDOW_DAYS]`
    pub fn is_upcoming(repair: &MachineRepair, today: NaiveDate) -> bool {
        let Some(due) = repair.next_due_date.as_deref().and_then(time::parse_calendar_date) else {
            return false;
        };
        let days = (due - today).num_days();
        (0..=UPCOMING_WINDOW_DAYS).contains(&days)
    }

    pub fn upcoming(&self, today: NaiveDate) -> Vec<MachineRepair> {
        self.list()
            .into_iter()
            .filter(|r| Self::is_upcoming(r, today))
            .collect()
    }

    /// Name of the repaired machine, or the placeholder
    pub fn machine_label(&self, repair: &MachineRepair) -> String {
        self.store.machine_editor().display_name(&repair.machine_id)
    }
}
