//! Column definitions with their validation rules and transformers.

mod rules;
pub mod transform;
mod types;

pub use rules::{InputValidationRule, RuleConfig};
pub use transform::{ColumnValueTransformer, InputTransformer};
pub use types::{ColumnDefinition, ColumnType};
