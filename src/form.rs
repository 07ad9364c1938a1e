//! Record form: a field-list descriptor plus display flags.
//!
//! One configurable component serves both the read-only detail view and the
//! add/edit form. The presenter renders it and hands back a field map on
//! confirm, or nothing on cancel.

use crate::error::{TaskError, TaskResult};
use crate::types::{Task, TaskFields};
use serde::Serialize;
use std::collections::HashMap;

/// One field of a record form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    /// Rendered as a multi-line editor when the form expands it.
    pub multiline: bool,
}

/// Editable task fields in display order. The description always comes last.
pub const TASK_FIELDS: [FieldSpec; 5] = [
    FieldSpec { key: "name", label: "Name", multiline: false },
    FieldSpec { key: "table_name", label: "Table", multiline: false },
    FieldSpec { key: "email", label: "Email", multiline: false },
    FieldSpec { key: "saved_email", label: "Saved email", multiline: false },
    FieldSpec { key: "task_description", label: "Description", multiline: true },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordForm {
    pub title: String,
    pub fields: Vec<FieldSpec>,
    pub values: HashMap<String, String>,
    pub editable: bool,
    pub expand_description: bool,
}

impl RecordForm {
    /// Empty template for creating a task.
    pub fn create() -> Self {
        Self::with_values("Add New Task", &TaskFields::default(), true)
    }

    /// Prefilled form for editing an existing task.
    pub fn edit(task: &Task) -> Self {
        Self::with_values("Edit Task", &task.fields(), true)
    }

    /// Read-only detail view.
    pub fn view(task: &Task) -> Self {
        Self::with_values("View Task", &task.fields(), false)
    }

    fn with_values(title: &str, fields: &TaskFields, editable: bool) -> Self {
        let values = fields
            .to_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            title: title.to_string(),
            fields: TASK_FIELDS.to_vec(),
            values,
            editable,
            expand_description: true,
        }
    }

    /// Current value of a field, empty when unset.
    pub fn value(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Whether the field should get a multi-line editor.
    pub fn is_expanded(&self, spec: &FieldSpec) -> bool {
        spec.multiline && self.expand_description
    }

    /// Turn a confirmed field map into task fields.
    ///
    /// Multi-line values lose their trailing newline the way a text editor
    /// widget would report them.
    pub fn submit(&self, mut values: HashMap<String, String>) -> TaskResult<TaskFields> {
        if !self.editable {
            return Err(TaskError::read_only());
        }
        for spec in self.fields.iter().filter(|s| s.multiline) {
            if let Some(v) = values.get_mut(spec.key) {
                *v = v.trim().to_string();
            }
        }
        TaskFields::from_map(&values).map_err(|key| TaskError::missing_field(&key))
    }
}
