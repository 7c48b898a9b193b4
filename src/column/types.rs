//! Column metadata: type, key/editable flags, attached rules and transformers.

use crate::column::{ColumnValueTransformer, InputTransformer, InputValidationRule};
use crate::column::transform::display_value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed set of primitive/display kinds a column can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Double,
    Boolean,
    String,
    Text,
    Date,
    Datetime,
    Time,
    Binary,
}

const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Double => "double",
            ColumnType::Boolean => "boolean",
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Date => "date",
            ColumnType::Datetime => "datetime",
            ColumnType::Time => "time",
            ColumnType::Binary => "binary",
        }
    }

    /// Map a PostgreSQL `information_schema.columns.data_type` to a column type.
    /// Anything unrecognised (varchar, uuid, json, user enums) is treated as a string.
    pub fn from_sql_type(data_type: &str) -> ColumnType {
        let lower = data_type.to_lowercase();
        if lower.starts_with("timestamp") {
            ColumnType::Datetime
        } else if lower.starts_with("time") {
            ColumnType::Time
        } else if lower == "date" {
            ColumnType::Date
        } else if matches!(
            lower.as_str(),
            "smallint" | "integer" | "bigint" | "int" | "int2" | "int4" | "int8" | "smallserial" | "serial" | "bigserial"
        ) {
            ColumnType::Integer
        } else if lower == "real" || lower == "double precision" || lower == "numeric" || lower == "decimal" {
            ColumnType::Double
        } else if lower == "boolean" || lower == "bool" {
            ColumnType::Boolean
        } else if lower == "text" {
            ColumnType::Text
        } else if lower == "bytea" {
            ColumnType::Binary
        } else {
            ColumnType::String
        }
    }

    /// Default conversion of a raw submitted value when the column has no input transformer.
    /// Empty input becomes null for every non-textual type.
    pub fn parse_input(self, raw: &str) -> Result<Value, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() && !matches!(self, ColumnType::String | ColumnType::Text) {
            return Ok(Value::Null);
        }
        match self {
            ColumnType::String | ColumnType::Text => Ok(Value::String(raw.to_string())),
            ColumnType::Binary => {
                if trimmed.len() % 2 == 0 && trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
                    Ok(Value::String(trimmed.to_ascii_lowercase()))
                } else {
                    Err("must be hexadecimal bytes".to_string())
                }
            }
            ColumnType::Integer => trimmed
                .parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .map_err(|_| "must be a whole number".to_string()),
            ColumnType::Double => trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| "must be a number".to_string()),
            ColumnType::Boolean => match trimmed.to_lowercase().as_str() {
                "true" | "on" | "1" | "yes" => Ok(Value::Bool(true)),
                "false" | "off" | "0" | "no" => Ok(Value::Bool(false)),
                _ => Err("must be true or false".to_string()),
            },
            ColumnType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .map_err(|_| "must be a date (YYYY-MM-DD)".to_string()),
            ColumnType::Datetime => match DateTime::parse_from_rfc3339(trimmed) {
                Ok(d) => Ok(Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string())),
                Err(_) => DATETIME_INPUT_FORMATS
                    .iter()
                    .find_map(|f| NaiveDateTime::parse_from_str(trimmed, f).ok())
                    .map(|d| Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
                    .ok_or_else(|| "must be a date and time (YYYY-MM-DDTHH:MM)".to_string()),
            },
            ColumnType::Time => ["%H:%M:%S%.f", "%H:%M"]
                .iter()
                .find_map(|f| NaiveTime::parse_from_str(trimmed, f).ok())
                .map(|t| Value::String(t.format("%H:%M:%S%.f").to_string()))
                .ok_or_else(|| "must be a time (HH:MM)".to_string()),
        }
    }
}

/// Describes one column of a resource.
#[derive(Clone, Debug)]
pub struct ColumnDefinition {
    name: String,
    column_type: ColumnType,
    key_column: bool,
    editable: bool,
    validation_rules: Vec<InputValidationRule>,
    input_transformer: Option<InputTransformer>,
    column_value_transformer: Option<ColumnValueTransformer>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        ColumnDefinition {
            name: name.into(),
            column_type,
            key_column: false,
            editable: false,
            validation_rules: Vec::new(),
            input_transformer: None,
            column_value_transformer: None,
        }
    }

    /// Marks the column as part of the key identifying a row.
    pub fn with_key(mut self, key_column: bool) -> Self {
        self.key_column = key_column;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn is_key_column(&self) -> bool {
        self.key_column
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn validation_rules(&self) -> &[InputValidationRule] {
        &self.validation_rules
    }

    pub fn input_transformer(&self) -> Option<&InputTransformer> {
        self.input_transformer.as_ref()
    }

    pub fn column_value_transformer(&self) -> Option<&ColumnValueTransformer> {
        self.column_value_transformer.as_ref()
    }

    pub fn set_editable(&mut self, editable: bool) -> &mut Self {
        self.editable = editable;
        self
    }

    /// Appends to the existing rules; never replaces them.
    pub fn add_validation_rules<I>(&mut self, rules: I) -> &mut Self
    where
        I: IntoIterator<Item = InputValidationRule>,
    {
        self.validation_rules.extend(rules);
        self
    }

    /// Replaces any previously set input transformer.
    pub fn set_input_transformer(&mut self, transformer: InputTransformer) -> &mut Self {
        self.input_transformer = Some(transformer);
        self
    }

    /// Replaces any previously set display transformer.
    pub fn set_column_value_transformer(&mut self, transformer: ColumnValueTransformer) -> &mut Self {
        self.column_value_transformer = Some(transformer);
        self
    }

    /// Display string for a stored value, via the display transformer when one is set.
    pub fn display(&self, value: &Value) -> String {
        match &self.column_value_transformer {
            Some(t) => t.apply(value),
            None => display_value(value),
        }
    }

    /// Converts a raw submitted value into the value to persist.
    pub fn convert_input(&self, raw: &str) -> Result<Value, String> {
        match &self.input_transformer {
            Some(t) => t.apply(raw),
            None => self.column_type.parse_input(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_postgres_data_types() {
        assert_eq!(ColumnType::from_sql_type("bigint"), ColumnType::Integer);
        assert_eq!(ColumnType::from_sql_type("integer"), ColumnType::Integer);
        assert_eq!(ColumnType::from_sql_type("timestamp with time zone"), ColumnType::Datetime);
        assert_eq!(ColumnType::from_sql_type("time without time zone"), ColumnType::Time);
        assert_eq!(ColumnType::from_sql_type("character varying"), ColumnType::String);
        assert_eq!(ColumnType::from_sql_type("uuid"), ColumnType::String);
        assert_eq!(ColumnType::from_sql_type("double precision"), ColumnType::Double);
        assert_eq!(ColumnType::from_sql_type("boolean"), ColumnType::Boolean);
        assert_eq!(ColumnType::from_sql_type("text"), ColumnType::Text);
    }

    #[test]
    fn parses_input_by_type() {
        assert_eq!(ColumnType::Integer.parse_input(" 42 ").unwrap(), Value::from(42));
        assert!(ColumnType::Integer.parse_input("4.2").is_err());
        assert_eq!(ColumnType::Boolean.parse_input("on").unwrap(), Value::Bool(true));
        assert_eq!(ColumnType::Date.parse_input("").unwrap(), Value::Null);
        assert_eq!(ColumnType::String.parse_input("").unwrap(), Value::String(String::new()));
        assert_eq!(
            ColumnType::Datetime.parse_input("2024-03-01T10:15").unwrap(),
            Value::String("2024-03-01T10:15:00".into())
        );
        assert!(ColumnType::Date.parse_input("01/03/2024").is_err());
    }

    #[test]
    fn binary_input_must_be_hex() {
        assert_eq!(ColumnType::Binary.parse_input("616263").unwrap(), Value::String("616263".into()));
        assert_eq!(ColumnType::Binary.parse_input(" 0A0b ").unwrap(), Value::String("0a0b".into()));
        assert_eq!(ColumnType::Binary.parse_input("").unwrap(), Value::Null);
        assert!(ColumnType::Binary.parse_input("abc").is_err());
        assert!(ColumnType::Binary.parse_input("zz").is_err());
    }

    #[test]
    fn datetime_input_keeps_fraction_and_offset() {
        assert_eq!(
            ColumnType::Datetime.parse_input("2024-03-01T10:15:00.123456").unwrap(),
            Value::String("2024-03-01T10:15:00.123456".into())
        );
        assert_eq!(
            ColumnType::Datetime.parse_input("2024-03-01T10:15:00.250000Z").unwrap(),
            Value::String("2024-03-01T10:15:00.250+00:00".into())
        );
    }

    #[test]
    fn set_editable_is_idempotent() {
        let mut col = ColumnDefinition::new("email", ColumnType::String);
        col.set_editable(true).set_editable(true);
        assert!(col.is_editable());
        assert!(!col.is_key_column());
    }

    #[test]
    fn rules_append_and_transformers_replace() {
        let mut col = ColumnDefinition::new("email", ColumnType::String);
        col.add_validation_rules([InputValidationRule::required()])
            .add_validation_rules([InputValidationRule::email()])
            .set_input_transformer(InputTransformer::trim())
            .set_input_transformer(InputTransformer::lowercase());
        let names: Vec<_> = col.validation_rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, ["required", "email"]);
        assert_eq!(col.input_transformer().map(|t| t.name()), Some("lowercase"));
        assert_eq!(col.convert_input("A@B.C").unwrap(), Value::String("a@b.c".into()));
    }
}
