//! Checks across a set of definitions that the DSL cannot see one resource at a time.

use crate::config::ResourceDefinition;
use crate::error::ConfigError;
use std::collections::HashSet;

pub fn validate(definitions: &[ResourceDefinition]) -> Result<(), ConfigError> {
    let mut tables = HashSet::new();
    for def in definitions {
        if def.table.trim().is_empty() {
            return Err(ConfigError::EmptyTableName);
        }
        if !tables.insert(def.table.as_str()) {
            return Err(ConfigError::DuplicateResource(def.table.clone()));
        }
        if let Some(columns) = &def.columns {
            let mut names = HashSet::new();
            for c in columns {
                if !names.insert(c.name.as_str()) {
                    return Err(ConfigError::DuplicateColumn {
                        column: c.name.clone(),
                        table: def.table.clone(),
                    });
                }
            }
        }
        for (column, rules) in &def.validation {
            rules.to_rules(column)?;
        }
    }
    Ok(())
}
