//! Data access: the DAO capability consumed by resources, and its PostgreSQL implementation.

mod params;
mod pg;
pub mod sql;

pub use params::PgBindValue;
pub use pg::PgDao;

use crate::error::DataAccessError;
use crate::schema::ResourceSchemaProvider;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One row as column name to value.
pub type Row = Map<String, Value>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortOrder {
    pub column: String,
    pub direction: SortDirection,
}

/// Reads and writes rows of one resource. Key values are given in primary-key order.
#[async_trait]
pub trait ResourceDao: ResourceSchemaProvider {
    async fn select_one(&self, keys: &[Value]) -> Result<Option<Row>, DataAccessError>;

    async fn select_page(
        &self,
        offset: u64,
        count: u64,
        sort: Option<&SortOrder>,
    ) -> Result<Vec<Row>, DataAccessError>;

    async fn count(&self) -> Result<u64, DataAccessError>;

    async fn insert(&self, row: &Row) -> Result<Row, DataAccessError>;

    async fn update(&self, keys: &[Value], row: &Row) -> Result<Option<Row>, DataAccessError>;

    /// Returns whether a row was deleted.
    async fn delete(&self, keys: &[Value]) -> Result<bool, DataAccessError>;
}
