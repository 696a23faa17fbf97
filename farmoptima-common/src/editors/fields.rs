//! Field catalog editor

use tracing::info;

use super::{optional_text, require_non_negative, require_text};
use crate::models::Field;
use crate::store::FarmStore;
use crate::{uuid_utils, Result};

/// Crop type recorded when none is given
pub const UNSPECIFIED_CROP: &str = "Unspecified";

/// Shown in place of a field that no longer exists
pub const UNKNOWN_FIELD_LABEL: &str = "Unknown Field";

/// Input for [`FieldsEditor::create`]
#[derive(Debug, Clone, Default)]
pub struct NewField {
    pub name: String,
    pub acres: f64,
    pub crop_type: Option<String>,
}

pub struct FieldsEditor<'a> {
    store: &'a FarmStore,
}

impl<'a> FieldsEditor<'a> {
    pub fn new(store: &'a FarmStore) -> Self {
        Self { store }
    }

    /// Append a new field with a generated id
    pub fn create(&self, new: NewField) -> Result<Field> {
        let field = Field {
            id: uuid_utils::new_record_id(),
            name: require_text(&new.name, "Field name")?,
            acres: require_non_negative(new.acres, "Acres")?,
            crop_type: Some(
                optional_text(new.crop_type).unwrap_or_else(|| UNSPECIFIED_CROP.to_string()),
            ),
        };

        self.store.fields().update(|fields| fields.push(field.clone()));
        info!(id = %field.id, name = %field.name, acres = field.acres, "Field added");
        Ok(field)
    }

    pub fn list(&self) -> Vec<Field> {
        self.store.fields().get()
    }

    pub fn get(&self, id: &str) -> Option<Field> {
        self.list().into_iter().find(|f| f.id == id)
    }

    /// Remove by id. Work logs pointing at the field are left as they are.
    pub fn delete(&self, id: &str) -> bool {
        let removed = self
            .store
            .fields()
            .try_update(|fields| {
                let index = fields.iter().position(|f| f.id == id)?;
                Some(fields.remove(index))
            });

        match removed {
            Some(field) => {
                info!(id = %field.id, name = %field.name, "Field removed");
                true
            }
            None => false,
        }
    }

    pub fn total_acres(&self) -> f64 {
        self.list().iter().map(|f| f.acres).sum()
    }

    /// Field name for a soft reference, or the placeholder label
    pub fn display_name(&self, id: &str) -> String {
        self.get(id)
            .map(|f| f.name)
            .unwrap_or_else(|| UNKNOWN_FIELD_LABEL.to_string())
    }
}
