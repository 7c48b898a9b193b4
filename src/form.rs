//! Processing of create/edit form submissions against a resource's configuration.

use crate::column::ColumnType;
use crate::dao::Row;
use crate::error::FieldError;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw values of one submitted form. `key_values` identify the row being edited.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPostEntry {
    #[serde(default)]
    pub key_values: BTreeMap<String, String>,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl FormPostEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn with_key(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.key_values.insert(column.into(), value.into());
        self
    }

    pub fn value(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

/// Validates and converts a submission into the row to persist.
///
/// Values for non-editable columns are dropped. Then the before hook, every editable
/// column's rules, and the after hook all run, collecting every error. Only a clean
/// submission is converted, via each column's input transformer or its type's default
/// parsing; an editable boolean column left out of the submission becomes `false`.
pub fn process_submission(resource: &Resource, entry: &FormPostEntry) -> Result<Row, Vec<FieldError>> {
    let editable: Vec<_> = resource
        .column_definitions()
        .iter()
        .filter(|c| c.is_editable())
        .collect();

    let mut filtered = FormPostEntry {
        key_values: entry.key_values.clone(),
        values: BTreeMap::new(),
    };
    for (column, value) in &entry.values {
        if editable.iter().any(|c| c.name() == column.as_str()) {
            filtered.values.insert(column.clone(), value.clone());
        } else {
            tracing::debug!(table = %resource.table_name(), column = %column, "dropping non-editable field");
        }
    }

    let mut errors = Vec::new();
    if let Some(before) = resource.before_validation() {
        errors.extend(before(resource, &filtered));
    }
    for column in &editable {
        let value = filtered.value(column.name());
        for rule in column.validation_rules() {
            if let Err(message) = rule.check(value) {
                errors.push(FieldError::new(column.name(), message));
            }
        }
    }
    if let Some(after) = resource.after_validation() {
        errors.extend(after(resource, &filtered));
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut row = Row::new();
    for column in &editable {
        match filtered.value(column.name()) {
            Some(raw) => match column.convert_input(raw) {
                Ok(v) => {
                    row.insert(column.name().to_string(), v);
                }
                Err(message) => errors.push(FieldError::new(column.name(), message)),
            },
            None if column.column_type() == ColumnType::Boolean => {
                row.insert(column.name().to_string(), serde_json::Value::Bool(false));
            }
            None => {}
        }
    }
    if errors.is_empty() {
        Ok(row)
    } else {
        Err(errors)
    }
}
