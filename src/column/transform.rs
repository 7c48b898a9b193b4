//! Input transformers (raw submitted string to persisted value) and display transformers.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::fmt::{self, Write};
use std::sync::Arc;

type InputFn = dyn Fn(&str) -> Result<Value, String> + Send + Sync;
type DisplayFn = dyn Fn(&Value) -> String + Send + Sync;

/// Converts a raw submitted value into the value to persist. Failure is a field-level message.
#[derive(Clone)]
pub struct InputTransformer {
    name: String,
    apply: Arc<InputFn>,
}

impl fmt::Debug for InputTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InputTransformer").field(&self.name).finish()
    }
}

impl InputTransformer {
    pub fn new<F>(name: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        InputTransformer {
            name: name.into(),
            apply: Arc::new(apply),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, raw: &str) -> Result<Value, String> {
        (self.apply)(raw)
    }

    pub fn trim() -> Self {
        Self::new("trim", |raw| Ok(Value::String(raw.trim().to_string())))
    }

    pub fn lowercase() -> Self {
        Self::new("lowercase", |raw| Ok(Value::String(raw.to_lowercase())))
    }

    /// Blank input is stored as null instead of an empty string.
    pub fn empty_as_null() -> Self {
        Self::new("empty_as_null", |raw| {
            if raw.trim().is_empty() {
                Ok(Value::Null)
            } else {
                Ok(Value::String(raw.to_string()))
            }
        })
    }

    /// Parses a date in the given chrono format and stores it as `YYYY-MM-DD`.
    pub fn date(format: &str) -> Self {
        let format = format.to_string();
        Self::new("date", move |raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(Value::Null);
            }
            NaiveDate::parse_from_str(raw, &format)
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .map_err(|_| format!("must be a date in format {}", format))
        })
    }
}

/// Renders a stored value for display. Must not fail.
#[derive(Clone)]
pub struct ColumnValueTransformer {
    name: String,
    apply: Arc<DisplayFn>,
}

impl fmt::Debug for ColumnValueTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ColumnValueTransformer").field(&self.name).finish()
    }
}

impl ColumnValueTransformer {
    pub fn new<F>(name: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        ColumnValueTransformer {
            name: name.into(),
            apply: Arc::new(apply),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, value: &Value) -> String {
        (self.apply)(value)
    }

    /// Reformats date, datetime, and RFC 3339 strings. Anything unparseable is shown as-is.
    pub fn date_format(format: &str) -> Self {
        let format = format.to_string();
        Self::new("date_format", move |value| {
            let Value::String(s) = value else {
                return display_value(value);
            };
            let mut out = String::new();
            let written = if let Ok(d) = DateTime::parse_from_rfc3339(s) {
                write!(out, "{}", d.format(&format))
            } else if let Ok(d) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                write!(out, "{}", d.format(&format))
            } else if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                write!(out, "{}", d.format(&format))
            } else {
                return s.clone();
            };
            match written {
                Ok(()) => out,
                Err(_) => s.clone(),
            }
        })
    }

    pub fn yes_no() -> Self {
        Self::new("yes_no", |value| match value {
            Value::Bool(true) => "Yes".to_string(),
            Value::Bool(false) => "No".to_string(),
            other => display_value(other),
        })
    }

    pub fn truncate(max_chars: usize) -> Self {
        Self::new("truncate", move |value| {
            let s = display_value(value);
            if s.chars().count() <= max_chars {
                s
            } else {
                let mut cut: String = s.chars().take(max_chars).collect();
                cut.push_str("...");
                cut
            }
        })
    }
}

/// Default rendering: strings unquoted, null as empty.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_transformers() {
        assert_eq!(InputTransformer::trim().apply("  x ").unwrap(), json!("x"));
        assert_eq!(InputTransformer::empty_as_null().apply(" ").unwrap(), Value::Null);
        let date = InputTransformer::date("%d/%m/%Y");
        assert_eq!(date.apply("01/03/2024").unwrap(), json!("2024-03-01"));
        assert!(date.apply("2024-03-01").is_err());
    }

    #[test]
    fn display_transformers() {
        let fmt = ColumnValueTransformer::date_format("%d %b %Y");
        assert_eq!(fmt.apply(&json!("2024-03-01")), "01 Mar 2024");
        assert_eq!(fmt.apply(&json!("2024-03-01T08:30:00")), "01 Mar 2024");
        assert_eq!(fmt.apply(&json!("2024-03-01T08:30:00+00:00")), "01 Mar 2024");
        assert_eq!(fmt.apply(&json!("soon")), "soon");
        assert_eq!(ColumnValueTransformer::yes_no().apply(&json!(true)), "Yes");
        assert_eq!(ColumnValueTransformer::truncate(3).apply(&json!("abcdef")), "abc...");
        assert_eq!(display_value(&json!(12)), "12");
        assert_eq!(display_value(&Value::Null), "");
    }
}
