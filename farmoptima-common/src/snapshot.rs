//! Snapshot export and import
//!
//! A snapshot is one JSON document holding every collection plus an export
//! timestamp and format version. Import is shallow and per key: each of the
//! five collection keys that holds an array replaces its slot wholesale;
//! every other key is left alone. Array entries are decoded tolerantly and
//! only entries with no record form at all are dropped.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Field, FieldWork, Machine, MachineRepair};
use crate::store::{FarmStore, SlotKey};
use crate::time::{self, DATE_FORMAT};
use crate::Result;

/// Format version written into every export
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Import rejection. The store is untouched in both cases.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Document is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("No valid data found in document")]
    NoValidData,
}

/// Full-collection export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub fields: Vec<Field>,
    pub machines: Vec<Machine>,
    pub works: Vec<FieldWork>,
    pub repairs: Vec<MachineRepair>,
    pub machine_types: Vec<String>,
    /// ISO-8601, informational only
    pub export_date: String,
    /// Informational only, not checked on import
    pub version: String,
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Outcome of a committed import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Slots replaced wholesale, in document order
    pub replaced: Vec<SlotKey>,
    /// Recognized keys that were missing or not arrays
    pub skipped: Vec<SlotKey>,
}

impl ImportReport {
    /// Whether views must re-read the store
    pub fn reload_required(&self) -> bool {
        !self.replaced.is_empty()
    }
}

/// Capture every slot as of now
pub fn export_snapshot(store: &FarmStore) -> Snapshot {
    export_snapshot_at(store, time::now())
}

pub fn export_snapshot_at(store: &FarmStore, exported_at: DateTime<Utc>) -> Snapshot {
    Snapshot {
        fields: store.fields().get(),
        machines: store.machines().get(),
        works: store.works().get(),
        repairs: store.repairs().get(),
        machine_types: store.machine_types().get(),
        export_date: time::to_iso8601(exported_at),
        version: SNAPSHOT_VERSION.to_string(),
    }
}

/// `farm-data-YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("farm-data-{}.json", date.format(DATE_FORMAT))
}

/// Write a formatted snapshot into `dir`, returning the created file
pub fn write_export(store: &FarmStore, dir: &Path) -> Result<PathBuf> {
    let snapshot = export_snapshot(store);
    let path = dir.join(export_file_name(time::today()));
    std::fs::write(&path, snapshot.to_json_pretty()?)?;

    info!(
        path = %path.display(),
        fields = snapshot.fields.len(),
        machines = snapshot.machines.len(),
        works = snapshot.works.len(),
        repairs = snapshot.repairs.len(),
        "Snapshot exported"
    );
    Ok(path)
}

/// Collections that passed the shape check, held until commit
#[derive(Default)]
struct StagedImport {
    fields: Option<Vec<Field>>,
    machines: Option<Vec<Machine>>,
    works: Option<Vec<FieldWork>>,
    repairs: Option<Vec<MachineRepair>>,
    machine_types: Option<Vec<String>>,
    report: ImportReport,
}

impl StagedImport {
    fn from_document(document: &Value) -> Self {
        let mut staged = Self::default();
        for key in SlotKey::ALL {
            let accepted = match key {
                SlotKey::Fields => stage(document, key, record, &mut staged.fields),
                SlotKey::Machines => stage(document, key, record, &mut staged.machines),
                SlotKey::Works => stage(document, key, record, &mut staged.works),
                SlotKey::Repairs => stage(document, key, record, &mut staged.repairs),
                SlotKey::MachineTypes => stage(document, key, label, &mut staged.machine_types),
            };
            if accepted {
                staged.report.replaced.push(key);
            } else {
                staged.report.skipped.push(key);
            }
        }
        staged
    }

    fn commit(self, store: &FarmStore) -> ImportReport {
        if let Some(fields) = self.fields {
            store.fields().replace(fields);
        }
        if let Some(machines) = self.machines {
            store.machines().replace(machines);
        }
        if let Some(works) = self.works {
            store.works().replace(works);
        }
        if let Some(repairs) = self.repairs {
            store.repairs().replace(repairs);
        }
        if let Some(machine_types) = self.machine_types {
            store.machine_types().replace(machine_types);
        }
        self.report
    }
}

/// Stage `document[key]` into `slot` if it is an array
///
/// Entries `decode` has no form for are dropped; the key is still accepted.
fn stage<T>(
    document: &Value,
    key: SlotKey,
    decode: impl Fn(&Value) -> Option<T>,
    slot: &mut Option<Vec<T>>,
) -> bool {
    let field = key.snapshot_field();
    match document.get(field) {
        Some(Value::Array(items)) => {
            let decoded: Vec<T> = items.iter().filter_map(&decode).collect();
            let dropped = items.len() - decoded.len();
            if dropped > 0 {
                warn!(key = field, dropped, "Import: dropped entries with no record form");
            }
            *slot = Some(decoded);
            true
        }
        Some(_) => {
            warn!(key = field, "Import: value is not an array, skipping key");
            false
        }
        None => false,
    }
}

/// Any JSON object is a record; attribute decoding is tolerant
fn record<T: DeserializeOwned>(item: &Value) -> Option<T> {
    T::deserialize(item).ok()
}

/// Machine type labels are the string entries
fn label(item: &Value) -> Option<String> {
    item.as_str().map(str::to_string)
}

/// Import a snapshot document into `store`
///
/// Fails without touching the store when the text is not JSON or none of
/// the five collection keys holds an array. Otherwise every validated slot is
/// replaced and one [`crate::events::StoreEvent::StoreInvalidated`] lists them.
pub fn import_snapshot(store: &FarmStore, document: &str) -> std::result::Result<ImportReport, ImportError> {
    let value: Value = serde_json::from_str(document)?;

    let staged = StagedImport::from_document(&value);
    if staged.report.replaced.is_empty() {
        warn!("Import: no valid data found, store unchanged");
        return Err(ImportError::NoValidData);
    }

    let report = staged.commit(store);
    if report.reload_required() {
        store.broadcast_invalidation(report.replaced.clone());
    }

    info!(
        replaced = ?report.replaced,
        skipped = ?report.skipped,
        "Snapshot imported"
    );
    Ok(report)
}

/// Read a snapshot document from disk and import it
pub fn import_from_path(store: &FarmStore, path: &Path) -> Result<ImportReport> {
    let document = std::fs::read_to_string(path)?;
    Ok(import_snapshot(store, &document)?)
}
