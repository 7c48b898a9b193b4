//! PostgreSQL DAO: column metadata from information_schema, rows as JSON maps.

use crate::column::{ColumnDefinition, ColumnType};
use crate::dao::sql::{self, quoted, QueryBuf, SqlColumn, TableRef};
use crate::dao::{PgBindValue, ResourceDao, Row, SortOrder};
use crate::error::DataAccessError;
use crate::schema::ResourceSchemaProvider;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use tokio::sync::OnceCell;

const COLUMNS_SQL: &str = r#"
SELECT c.column_name::text, c.data_type::text, c.udt_schema::text, c.udt_name::text,
    EXISTS (
        SELECT 1
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage k
            ON k.constraint_schema = tc.constraint_schema AND k.constraint_name = tc.constraint_name
        WHERE tc.constraint_type = 'PRIMARY KEY'
            AND tc.table_schema = c.table_schema
            AND tc.table_name = c.table_name
            AND k.column_name = c.column_name
    ) AS is_key
FROM information_schema.columns c
WHERE c.table_schema = $1 AND c.table_name = $2
ORDER BY c.ordinal_position
"#;

/// DAO for one table. Column metadata is loaded on first use and cached.
pub struct PgDao {
    pool: PgPool,
    table: TableRef,
    columns: OnceCell<Vec<SqlColumn>>,
}

impl PgDao {
    pub fn new(pool: PgPool, schema: impl Into<String>, table: impl Into<String>) -> Self {
        PgDao {
            pool,
            table: TableRef {
                schema: schema.into(),
                table: table.into(),
            },
            columns: OnceCell::new(),
        }
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    async fn columns(&self) -> Result<&[SqlColumn], DataAccessError> {
        self.columns
            .get_or_try_init(|| self.load_columns())
            .await
            .map(Vec::as_slice)
    }

    async fn load_columns(&self) -> Result<Vec<SqlColumn>, DataAccessError> {
        tracing::debug!(sql = %COLUMNS_SQL, table = %self.table.table, "query");
        let rows = sqlx::query_as::<_, (String, String, String, String, bool)>(COLUMNS_SQL)
            .bind(&self.table.schema)
            .bind(&self.table.table)
            .fetch_all(&self.pool)
            .await?;
        if rows.is_empty() {
            return Err(DataAccessError::UnknownTable(self.table.qualified()));
        }
        let columns: Vec<SqlColumn> = rows
            .into_iter()
            .map(|(name, data_type, udt_schema, udt_name, is_key)| SqlColumn {
                name,
                column_type: ColumnType::from_sql_type(&data_type),
                key: is_key,
                cast: parameter_cast(&data_type, &udt_schema, &udt_name),
            })
            .collect();
        tracing::info!(
            table = %self.table.qualified(),
            columns = columns.len(),
            "loaded column metadata"
        );
        Ok(columns)
    }

    async fn fetch_optional(&self, q: &QueryBuf, columns: &[SqlColumn]) -> Result<Option<Row>, DataAccessError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(&self.pool).await?;
        row.map(|r| row_to_json(&r, columns)).transpose()
    }
}

/// Cast that makes every parameter, including an untyped NULL, land in the column's actual type.
/// Only plain text columns take parameters as they are.
fn parameter_cast(data_type: &str, udt_schema: &str, udt_name: &str) -> Option<String> {
    match data_type.to_lowercase().as_str() {
        "character varying" | "character" | "text" => None,
        "user-defined" => Some(format!("{}.{}", quoted(udt_schema), quoted(udt_name))),
        _ => Some(udt_name.to_string()),
    }
}

fn row_to_json(row: &PgRow, columns: &[SqlColumn]) -> Result<Row, DataAccessError> {
    use sqlx::Row as _;
    let mut map = Row::new();
    for c in columns {
        let name = c.name.as_str();
        let value = match c.column_type {
            ColumnType::Integer => row.try_get::<Option<i64>, _>(name)?.map(Value::from),
            ColumnType::Double => row
                .try_get::<Option<f64>, _>(name)?
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            ColumnType::Boolean => row.try_get::<Option<bool>, _>(name)?.map(Value::Bool),
            _ => row.try_get::<Option<String>, _>(name)?.map(Value::String),
        };
        map.insert(c.name.clone(), value.unwrap_or(Value::Null));
    }
    Ok(map)
}

#[async_trait]
impl ResourceSchemaProvider for PgDao {
    async fn column_definitions(&self) -> Result<Vec<ColumnDefinition>, DataAccessError> {
        Ok(self
            .columns()
            .await?
            .iter()
            .map(|c| ColumnDefinition::new(c.name.clone(), c.column_type).with_key(c.key))
            .collect())
    }
}

#[async_trait]
impl ResourceDao for PgDao {
    async fn select_one(&self, keys: &[Value]) -> Result<Option<Row>, DataAccessError> {
        let columns = self.columns().await?;
        let q = sql::select_by_keys(&self.table, columns, keys)?;
        self.fetch_optional(&q, columns).await
    }

    async fn select_page(
        &self,
        offset: u64,
        count: u64,
        sort: Option<&SortOrder>,
    ) -> Result<Vec<Row>, DataAccessError> {
        let columns = self.columns().await?;
        let q = sql::select_page(&self.table, columns, offset, count, sort);
        tracing::debug!(sql = %q.sql, "query");
        let rows = sqlx::query(&q.sql).fetch_all(&self.pool).await?;
        rows.iter().map(|r| row_to_json(r, columns)).collect()
    }

    async fn count(&self) -> Result<u64, DataAccessError> {
        let q = sql::count(&self.table);
        tracing::debug!(sql = %q.sql, "query");
        let n = sqlx::query_scalar::<_, i64>(&q.sql).fetch_one(&self.pool).await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn insert(&self, row: &Row) -> Result<Row, DataAccessError> {
        let columns = self.columns().await?;
        let q = sql::insert(&self.table, columns, row);
        self.fetch_optional(&q, columns)
            .await?
            .ok_or(DataAccessError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(&self, keys: &[Value], row: &Row) -> Result<Option<Row>, DataAccessError> {
        let columns = self.columns().await?;
        let q = sql::update(&self.table, columns, keys, row)?;
        self.fetch_optional(&q, columns).await
    }

    async fn delete(&self, keys: &[Value]) -> Result<bool, DataAccessError> {
        let columns = self.columns().await?;
        let q = sql::delete(&self.table, columns, keys)?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casts_every_non_text_column() {
        assert_eq!(parameter_cast("integer", "pg_catalog", "int4").as_deref(), Some("int4"));
        assert_eq!(parameter_cast("boolean", "pg_catalog", "bool").as_deref(), Some("bool"));
        assert_eq!(
            parameter_cast("double precision", "pg_catalog", "float8").as_deref(),
            Some("float8")
        );
        assert_eq!(parameter_cast("text", "pg_catalog", "text"), None);
        assert_eq!(parameter_cast("character varying", "pg_catalog", "varchar"), None);
        assert_eq!(parameter_cast("uuid", "pg_catalog", "uuid").as_deref(), Some("uuid"));
        assert_eq!(
            parameter_cast("timestamp with time zone", "pg_catalog", "timestamptz").as_deref(),
            Some("timestamptz")
        );
        assert_eq!(
            parameter_cast("USER-DEFINED", "sales", "order_status").as_deref(),
            Some("\"sales\".\"order_status\"")
        );
    }
}
