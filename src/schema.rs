//! Schema capability: column metadata for one resource.

use crate::column::ColumnDefinition;
use crate::error::DataAccessError;
use async_trait::async_trait;

#[async_trait]
pub trait ResourceSchemaProvider: Send + Sync {
    /// Full list of columns making up the resource, in definition order.
    async fn column_definitions(&self) -> Result<Vec<ColumnDefinition>, DataAccessError>;

    /// Columns that together identify a row.
    async fn key_columns(&self) -> Result<Vec<ColumnDefinition>, DataAccessError> {
        Ok(self
            .column_definitions()
            .await?
            .into_iter()
            .filter(ColumnDefinition::is_key_column)
            .collect())
    }
}

/// Schema declared in code or a definition file rather than read from a database.
#[derive(Clone, Debug, Default)]
pub struct StaticSchema {
    columns: Vec<ColumnDefinition>,
}

impl StaticSchema {
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        StaticSchema { columns }
    }
}

#[async_trait]
impl ResourceSchemaProvider for StaticSchema {
    async fn column_definitions(&self) -> Result<Vec<ColumnDefinition>, DataAccessError> {
        Ok(self.columns.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;

    #[tokio::test]
    async fn key_columns_keep_definition_order() {
        let schema = StaticSchema::new(vec![
            ColumnDefinition::new("tenant_id", ColumnType::Integer).with_key(true),
            ColumnDefinition::new("name", ColumnType::String),
            ColumnDefinition::new("id", ColumnType::Integer).with_key(true),
        ]);
        let keys = schema.key_columns().await.unwrap();
        let names: Vec<_> = keys.iter().map(ColumnDefinition::name).collect();
        assert_eq!(names, ["tenant_id", "id"]);
    }
}
