//! Field operations log editor

use std::collections::BTreeSet;

use tracing::info;

use super::{optional_text, require_date, require_text};
use crate::models::FieldWork;
use crate::store::FarmStore;
use crate::{uuid_utils, Result};

/// Input for [`WorksEditor::create`]
#[derive(Debug, Clone, Default)]
pub struct NewFieldWork {
    pub field_id: String,
    pub date: String,
    pub task: String,
    pub notes: Option<String>,
}

/// List filter; `None` matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkFilter {
    pub field_id: Option<String>,
    pub task: Option<String>,
}

impl WorkFilter {
    pub fn matches(&self, work: &FieldWork) -> bool {
        let field_ok = self.field_id.as_ref().map_or(true, |id| *id == work.field_id);
        let task_ok = self.task.as_ref().map_or(true, |task| *task == work.task);
        field_ok && task_ok
    }

    pub fn is_empty(&self) -> bool {
        self.field_id.is_none() && self.task.is_none()
    }
}

pub struct WorksEditor<'a> {
    store: &'a FarmStore,
}

impl<'a> WorksEditor<'a> {
    pub fn new(store: &'a FarmStore) -> Self {
        Self { store }
    }

    /// Log a new operation; newest entries come first.
    ///
    /// The field id is not checked against the field catalog.
    pub fn create(&self, new: NewFieldWork) -> Result<FieldWork> {
        let work = FieldWork {
            id: uuid_utils::new_record_id(),
            field_id: require_text(&new.field_id, "Field")?,
            date: require_date(&new.date, "Date")?,
            task: require_text(&new.task, "Task")?,
            notes: optional_text(new.notes),
        };

        self.store.works().update(|works| works.insert(0, work.clone()));
        info!(id = %work.id, field_id = %work.field_id, task = %work.task, "Field work logged");
        Ok(work)
    }

    pub fn list(&self) -> Vec<FieldWork> {
        self.store.works().get()
    }

    pub fn delete(&self, id: &str) -> bool {
        let removed = self.store.works().try_update(|works| {
            let index = works.iter().position(|w| w.id == id)?;
            Some(works.remove(index))
        });

        if let Some(work) = &removed {
            info!(id = %work.id, "Field work removed");
        }
        removed.is_some()
    }

    pub fn filter(&self, filter: &WorkFilter) -> Vec<FieldWork> {
        self.list().into_iter().filter(|w| filter.matches(w)).collect()
    }

    /// Distinct task names, sorted
    pub fn unique_tasks(&self) -> Vec<String> {
        self.list()
            .into_iter()
            .map(|w| w.task)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Name of the field the work was logged against, or the placeholder
    pub fn field_label(&self, work: &FieldWork) -> String {
        self.store.field_editor().display_name(&work.field_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editors::{NewField, UNKNOWN_FIELD_LABEL};
    use crate::Error;

    fn work(field_id: &str, date: &str, task: &str) -> NewFieldWork {
        NewFieldWork {
            field_id: field_id.to_string(),
            date: date.to_string(),
            task: task.to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_create_prepends() {
        let store = FarmStore::in_memory();
        let editor = store.work_editor();

        let first = editor.create(work("f1", "2024-04-01", "Planting")).unwrap();
        let second = editor.create(work("f1", "2024-06-01", "Spraying")).unwrap();

        let ids: Vec<String> = editor.list().into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_create_validates_inputs() {
        let store = FarmStore::in_memory();
        let editor = store.work_editor();

        assert!(matches!(editor.create(work("", "2024-04-01", "Till")), Err(Error::InvalidInput(_))));
        assert!(matches!(editor.create(work("f1", "April", "Till")), Err(Error::InvalidInput(_))));
        assert!(matches!(editor.create(work("f1", "2024-04-01", " ")), Err(Error::InvalidInput(_))));
        assert!(editor.list().is_empty());
    }

    #[test]
    fn test_filter_and_unique_tasks() {
        let store = FarmStore::in_memory();
        let editor = store.work_editor();
        editor.create(work("f1", "2024-04-01", "Planting")).unwrap();
        editor.create(work("f2", "2024-04-02", "Planting")).unwrap();
        editor.create(work("f1", "2024-09-20", "Harvest")).unwrap();

        assert_eq!(editor.filter(&WorkFilter::default()).len(), 3);

        let by_field = WorkFilter {
            field_id: Some("f1".to_string()),
            task: None,
        };
        assert_eq!(editor.filter(&by_field).len(), 2);

        let both = WorkFilter {
            field_id: Some("f1".to_string()),
            task: Some("Planting".to_string()),
        };
        assert_eq!(editor.filter(&both).len(), 1);

        assert_eq!(editor.unique_tasks(), vec!["Harvest".to_string(), "Planting".to_string()]);
        // Filtering never mutates
        assert_eq!(editor.list().len(), 3);
    }

    #[test]
    fn test_deleting_field_orphans_work() {
        let store = FarmStore::in_memory();
        let field = store
            .field_editor()
            .create(NewField {
                name: "River".to_string(),
                acres: 15.0,
                crop_type: None,
            })
            .unwrap();
        let logged = store
            .work_editor()
            .create(work(&field.id, "2024-05-05", "Fertilizing"))
            .unwrap();

        assert_eq!(store.work_editor().field_label(&logged), "River");
        assert!(store.field_editor().delete(&field.id));

        let remaining = store.work_editor().list();
        assert_eq!(remaining, vec![logged.clone()]);
        assert_eq!(remaining[0].field_id, field.id);
        assert_eq!(store.work_editor().field_label(&logged), UNKNOWN_FIELD_LABEL);
    }

    #[test]
    fn test_delete() {
        let store = FarmStore::in_memory();
        let editor = store.work_editor();
        let logged = editor.create(work("f1", "2024-04-01", "Tillage")).unwrap();

        assert!(editor.delete(&logged.id));
        assert!(!editor.delete(&logged.id));
        assert!(editor.list().is_empty());
    }
}
