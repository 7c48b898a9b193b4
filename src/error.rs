//! Typed errors: configuration-time failures, data access failures, and field-level validation data.

use serde::Serialize;
use thiserror::Error;

/// Setup-time failure. Fatal: a resource that produces one must not be registered.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("column {column} not found for table {table}")]
    UnknownColumn { column: String, table: String },
    #[error("duplicate column {column} on table {table}")]
    DuplicateColumn { column: String, table: String },
    #[error("table name must not be empty")]
    EmptyTableName,
    #[error("per-page count must be positive (table {table})")]
    InvalidPerPageCount { table: String },
    #[error("duplicate resource: {0}")]
    DuplicateResource(String),
    #[error("invalid validation rule for {column}: {message}")]
    InvalidRule { column: String, message: String },
    #[error("config load: {0}")]
    Load(String),
}

impl ConfigError {
    pub(crate) fn unknown_column(column: &str, table: &str) -> Self {
        ConfigError::UnknownColumn {
            column: column.to_string(),
            table: table.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum DataAccessError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("table {0} has no primary key")]
    MissingPrimaryKey(String),
    #[error("table {table} expects {expected} key values, got {actual}")]
    KeyArity {
        table: String,
        expected: usize,
        actual: usize,
    },
    #[error("nothing to write for table {0}")]
    EmptyWrite(String),
    #[error("table {0} not found or has no columns")]
    UnknownTable(String),
}

/// Errors from setup paths that both read the schema and configure a resource.
#[derive(Error, Debug)]
pub enum AdminError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}

/// One field-level validation failure. Returned as data, never raised.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub column: String,
    pub message: String,
}

impl FieldError {
    pub fn new(column: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            column: column.into(),
            message: message.into(),
        }
    }
}
