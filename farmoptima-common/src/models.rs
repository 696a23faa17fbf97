//! Domain records
//!
//! Plain data with camelCase wire names. These are the exact shapes stored
//! in each persisted slot and carried by snapshot documents.

use serde::{Deserialize, Serialize};

/// Machine types seeded into a fresh store, in select-list order
pub const COMMON_MACHINE_TYPES: &[&str] = &[
    "Tractor", "Combine", "Planter", "Sprayer", "Truck", "ATV", "Loader", "Other",
];

/// Owned copy of [`COMMON_MACHINE_TYPES`]
pub fn default_machine_types() -> Vec<String> {
    COMMON_MACHINE_TYPES.iter().map(|t| t.to_string()).collect()
}

/// A tract of land
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Non-negative area in acres
    #[serde(default, deserialize_with = "lenient::number")]
    pub acres: f64,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub crop_type: Option<String>,
}

/// A piece of equipment in the fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    /// Always `manufacturer + " " + model`
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub model: String,
    /// Label from the type taxonomy at creation time. Not re-validated.
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub machine_type: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub horsepower: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub license_plate: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,
    /// Hours or kilometres, free text
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub usage: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub fuel_type: Option<String>,
}

impl Machine {
    /// Display name derived from manufacturer and model
    pub fn compose_name(manufacturer: &str, model: &str) -> String {
        format!("{} {}", manufacturer, model)
    }
}

/// A logged field operation (planting, spraying, harvest, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldWork {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    /// Soft reference to [`Field::id`]
    #[serde(default, deserialize_with = "lenient::text")]
    pub field_id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub task: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
}

/// A maintenance or repair log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRepair {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    /// Soft reference to [`Machine::id`]
    #[serde(default, deserialize_with = "lenient::text")]
    pub machine_id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub cost: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_due_date: Option<String>,
}

/// Narrative efficiency analysis returned by the gateway. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 0 to 100
    pub efficiency_score: f64,
    pub summary: String,
    pub recommendations: Vec<String>,
}

/// Tolerant attribute decoders for stored and imported records
///
/// Records written by hand or by older exports can carry `null`, missing or
/// wrong-typed attributes. None of these reject the record: text falls back
/// to empty, numbers to zero or `None`.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(optional_text(deserializer)?.unwrap_or_default())
    }

    /// Finite numbers, or numeric strings such as `"40"`
    pub fn optional_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let number = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(number.filter(|n| n.is_finite()))
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(optional_number(deserializer)?.unwrap_or_default())
    }

    pub fn optional_year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
        Ok(optional_number(deserializer)?
            .filter(|y| y.fract() == 0.0 && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(y))
            .map(|y| y as i32))
    }
}
