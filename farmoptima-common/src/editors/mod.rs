//! Collection editors
//!
//! Thin CRUD surfaces over the store slots. Editors hold no state of their
//! own; every read goes through the slot and every write replaces it.

mod fields;
mod machine_types;
mod machines;
mod repairs;
mod works;

pub use fields::{FieldsEditor, NewField, UNKNOWN_FIELD_LABEL, UNSPECIFIED_CROP};
pub use machine_types::MachineTypesEditor;
pub use machines::{MachineDetails, MachinesEditor, NewMachine, UNKNOWN_MACHINE_LABEL};
pub use repairs::{NewRepair, RepairsEditor, UPCOMING_WINDOW_DAYS};
pub use works::{NewFieldWork, WorkFilter, WorksEditor};

use crate::{time, Error, Result};

/// Trimmed copy of a required text input
fn require_text(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", what)));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text collapses to `None`
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Required `YYYY-MM-DD` date, returned trimmed
fn require_date(value: &str, what: &str) -> Result<String> {
    let date = require_text(value, what)?;
    if time::parse_calendar_date(&date).is_none() {
        return Err(Error::InvalidInput(format!(
            "{} must be a YYYY-MM-DD date, got '{}'",
            what, date
        )));
    }
    Ok(date)
}

/// Finite, non-negative quantity
fn require_non_negative(value: f64, what: &str) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidInput(format!(
            "{} must be a non-negative number, got {}",
            what, value
        )));
    }
    Ok(value)
}
