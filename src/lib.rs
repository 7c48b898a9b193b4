//! Admin resource configuration: column definitions, page elements, and a fluent DSL
//! for describing list and form pages of CRUD admin panels over PostgreSQL.

pub mod column;
pub mod config;
pub mod dao;
pub mod dsl;
pub mod elements;
pub mod error;
pub mod form;
pub mod registry;
pub mod resource;
pub mod schema;

pub use column::{ColumnDefinition, ColumnType, ColumnValueTransformer, InputTransformer, InputValidationRule};
pub use config::{build_registry, build_resource, load_from_path, ResourceDefinition};
pub use dao::{PgDao, ResourceDao, Row, SortDirection, SortOrder};
pub use dsl::{FormBuilder, IndexBuilder, InputGroupBuilder, ResourceBuilder};
pub use elements::{PageElement, SelectOption};
pub use error::{AdminError, ConfigError, DataAccessError, FieldError};
pub use form::{process_submission, FormPostEntry};
pub use registry::{Registry, ResourceRegistry};
pub use resource::{Resource, ValidationFunction};
pub use schema::{ResourceSchemaProvider, StaticSchema};
