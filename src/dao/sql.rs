//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for one table.
//! Identifiers come from schema metadata only; values are always parameters.

use crate::column::ColumnType;
use crate::dao::{Row, SortDirection, SortOrder};
use crate::error::DataAccessError;
use serde_json::Value;

/// Column as the SQL layer sees it.
#[derive(Clone, Debug)]
pub struct SqlColumn {
    pub name: String,
    pub column_type: ColumnType,
    pub key: bool,
    /// Cast applied to bound parameters (e.g. `int4`, `uuid`, `"sales"."order_status"`).
    pub cast: Option<String>,
}

impl SqlColumn {
    /// `timestamptz` columns are read back in UTC with an explicit offset.
    fn is_zoned(&self) -> bool {
        self.cast.as_deref() == Some("timestamptz")
    }
}

#[derive(Clone, Debug)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn qualified(&self) -> String {
        format!("{}.{}", quoted(&self.schema), quoted(&self.table))
    }
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter for the column and returns its placeholder expression.
    /// Binary values travel as hex text; everything else is cast to the column's type.
    fn push_param(&mut self, v: Value, column: &SqlColumn) -> String {
        self.params.push(v);
        let n = self.params.len();
        if column.column_type == ColumnType::Binary {
            return format!("decode(${}, 'hex')", n);
        }
        match &column.cast {
            Some(t) => format!("${}::{}", n, t),
            None => format!("${}", n),
        }
    }
}

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Each column read back in a form that decodes by its column type.
fn select_column_list(columns: &[SqlColumn]) -> String {
    columns
        .iter()
        .map(|c| {
            let q = quoted(&c.name);
            let expr = match c.column_type {
                ColumnType::Integer => format!("{}::int8", q),
                ColumnType::Double => format!("{}::float8", q),
                ColumnType::Boolean => q.clone(),
                ColumnType::Datetime if c.is_zoned() => format!(
                    "to_char({} AT TIME ZONE 'UTC', 'YYYY-MM-DD\"T\"HH24:MI:SS.US\"Z\"')",
                    q
                ),
                ColumnType::Datetime => format!("to_char({}, 'YYYY-MM-DD\"T\"HH24:MI:SS.US')", q),
                ColumnType::Binary => format!("encode({}, 'hex')", q),
                ColumnType::String | ColumnType::Text | ColumnType::Date | ColumnType::Time => format!("{}::text", q),
            };
            format!("{} AS {}", expr, q)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn key_columns(table: &TableRef, columns: &[SqlColumn]) -> Result<Vec<SqlColumn>, DataAccessError> {
    let keys: Vec<SqlColumn> = columns.iter().filter(|c| c.key).cloned().collect();
    if keys.is_empty() {
        return Err(DataAccessError::MissingPrimaryKey(table.table.clone()));
    }
    Ok(keys)
}

/// `"k1" = $n AND "k2" = $m`, binding key values in key-column order.
fn key_where(
    q: &mut QueryBuf,
    table: &TableRef,
    columns: &[SqlColumn],
    keys: &[Value],
) -> Result<String, DataAccessError> {
    let key_cols = key_columns(table, columns)?;
    if key_cols.len() != keys.len() {
        return Err(DataAccessError::KeyArity {
            table: table.table.clone(),
            expected: key_cols.len(),
            actual: keys.len(),
        });
    }
    let parts: Vec<String> = key_cols
        .iter()
        .zip(keys)
        .map(|(c, v)| {
            let ph = q.push_param(v.clone(), c);
            format!("{} = {}", quoted(&c.name), ph)
        })
        .collect();
    Ok(parts.join(" AND "))
}

pub fn select_by_keys(table: &TableRef, columns: &[SqlColumn], keys: &[Value]) -> Result<QueryBuf, DataAccessError> {
    let mut q = QueryBuf::new();
    let where_clause = key_where(&mut q, table, columns, keys)?;
    q.sql = format!(
        "SELECT {} FROM {} WHERE {}",
        select_column_list(columns),
        table.qualified(),
        where_clause
    );
    Ok(q)
}

/// One page of rows. Sorts by the requested column when it exists, else by the key columns.
pub fn select_page(
    table: &TableRef,
    columns: &[SqlColumn],
    offset: u64,
    count: u64,
    sort: Option<&SortOrder>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let order: Vec<String> = match sort.filter(|s| columns.iter().any(|c| c.name == s.column)) {
        Some(s) => {
            let dir = match s.direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            vec![format!("{} {}", quoted(&s.column), dir)]
        }
        None => columns.iter().filter(|c| c.key).map(|c| quoted(&c.name)).collect(),
    };
    let order_clause = if order.is_empty() {
        String::new()
    } else {
        format!(" ORDER BY {}", order.join(", "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{} LIMIT {} OFFSET {}",
        select_column_list(columns),
        table.qualified(),
        order_clause,
        count,
        offset
    );
    q
}

pub fn count(table: &TableRef) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) FROM {}", table.qualified());
    q
}

/// INSERT of the row's known columns, in column order. Unknown keys in the row are ignored.
pub fn insert(table: &TableRef, columns: &[SqlColumn], row: &Row) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in columns {
        let Some(v) = row.get(&c.name) else { continue };
        placeholders.push(q.push_param(v.clone(), c));
        cols.push(quoted(&c.name));
    }
    let returning = select_column_list(columns);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table.qualified(), returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table.qualified(),
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by key: SET only non-key columns present in the row.
pub fn update(table: &TableRef, columns: &[SqlColumn], keys: &[Value], row: &Row) -> Result<QueryBuf, DataAccessError> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in columns.iter().filter(|c| !c.key) {
        let Some(v) = row.get(&c.name) else { continue };
        let ph = q.push_param(v.clone(), c);
        sets.push(format!("{} = {}", quoted(&c.name), ph));
    }
    if sets.is_empty() {
        return Err(DataAccessError::EmptyWrite(table.table.clone()));
    }
    let where_clause = key_where(&mut q, table, columns, keys)?;
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} RETURNING {}",
        table.qualified(),
        sets.join(", "),
        where_clause,
        select_column_list(columns)
    );
    Ok(q)
}

pub fn delete(table: &TableRef, columns: &[SqlColumn], keys: &[Value]) -> Result<QueryBuf, DataAccessError> {
    let mut q = QueryBuf::new();
    let where_clause = key_where(&mut q, table, columns, keys)?;
    q.sql = format!("DELETE FROM {} WHERE {}", table.qualified(), where_clause);
    Ok(q)
}
