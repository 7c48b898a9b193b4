//! Per-column input validation rules and their JSON form.

use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type RuleFn = dyn Fn(Option<&str>) -> Result<(), String> + Send + Sync;

/// A named check applied to the raw submitted value of one column.
/// The value is `None` when the field was not submitted.
#[derive(Clone)]
pub struct InputValidationRule {
    name: String,
    check: Arc<RuleFn>,
}

impl fmt::Debug for InputValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InputValidationRule").field(&self.name).finish()
    }
}

/// Present, non-blank value or `None`. Optional rules skip absent values.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl InputValidationRule {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(Option<&str>) -> Result<(), String> + Send + Sync + 'static,
    {
        InputValidationRule {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the failure message, if any.
    pub fn check(&self, value: Option<&str>) -> Result<(), String> {
        (self.check)(value)
    }

    pub fn required() -> Self {
        Self::new("required", |v| match present(v) {
            Some(_) => Ok(()),
            None => Err("is required".into()),
        })
    }

    pub fn min_length(min: usize) -> Self {
        Self::new("min_length", move |v| match present(v) {
            Some(s) if s.chars().count() < min => Err(format!("must be at least {} characters", min)),
            _ => Ok(()),
        })
    }

    pub fn max_length(max: usize) -> Self {
        Self::new("max_length", move |v| match present(v) {
            Some(s) if s.chars().count() > max => Err(format!("must be at most {} characters", max)),
            _ => Ok(()),
        })
    }

    /// Compiled once at configuration time.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        let re = Regex::new(pattern)?;
        Ok(Self::new("pattern", move |v| match present(v) {
            Some(s) if !re.is_match(s) => Err("does not match required pattern".into()),
            _ => Ok(()),
        }))
    }

    pub fn email() -> Self {
        Self::new("email", |v| match present(v) {
            Some(s) if !s.contains('@') || s.len() < 3 => Err("must be a valid email".into()),
            _ => Ok(()),
        })
    }

    pub fn uuid() -> Self {
        Self::new("uuid", |v| match present(v) {
            Some(s) if uuid::Uuid::parse_str(s.trim()).is_err() => Err("must be a valid UUID".into()),
            _ => Ok(()),
        })
    }

    pub fn one_of<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
        Self::new("one_of", move |v| match present(v) {
            Some(s) if !allowed.iter().any(|a| a == s) => Err(format!(
                "must be one of: {}",
                allowed.iter().take(5).cloned().collect::<Vec<_>>().join(", ")
            )),
            _ => Ok(()),
        })
    }

    pub fn minimum(min: f64) -> Self {
        Self::new("minimum", move |v| match present(v).map(|s| s.trim().parse::<f64>()) {
            Some(Ok(n)) if n < min => Err(format!("must be at least {}", min)),
            Some(Err(_)) => Err("must be a number".into()),
            _ => Ok(()),
        })
    }

    pub fn maximum(max: f64) -> Self {
        Self::new("maximum", move |v| match present(v).map(|s| s.trim().parse::<f64>()) {
            Some(Ok(n)) if n > max => Err(format!("must be at most {}", max)),
            Some(Err(_)) => Err("must be a number".into()),
            _ => Ok(()),
        })
    }
}

/// Rule set as written in a resource definition file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

impl RuleConfig {
    /// Expands into rules in a fixed order: required, format, lengths, pattern, allowed, bounds.
    pub fn to_rules(&self, column: &str) -> Result<Vec<InputValidationRule>, ConfigError> {
        let mut rules = Vec::new();
        if self.required == Some(true) {
            rules.push(InputValidationRule::required());
        }
        if let Some(format) = &self.format {
            match format.to_lowercase().as_str() {
                "email" => rules.push(InputValidationRule::email()),
                "uuid" => rules.push(InputValidationRule::uuid()),
                other => {
                    return Err(ConfigError::InvalidRule {
                        column: column.to_string(),
                        message: format!("unknown format '{}'", other),
                    })
                }
            }
        }
        if let Some(min) = self.min_length {
            rules.push(InputValidationRule::min_length(min));
        }
        if let Some(max) = self.max_length {
            rules.push(InputValidationRule::max_length(max));
        }
        if let Some(pattern) = &self.pattern {
            let rule = InputValidationRule::pattern(pattern).map_err(|e| ConfigError::InvalidRule {
                column: column.to_string(),
                message: e.to_string(),
            })?;
            rules.push(rule);
        }
        if let Some(allowed) = &self.allowed {
            rules.push(InputValidationRule::one_of(allowed.iter().map(value_as_text)));
        }
        if let Some(min) = self.minimum {
            rules.push(InputValidationRule::minimum(min));
        }
        if let Some(max) = self.maximum {
            rules.push(InputValidationRule::maximum(max));
        }
        Ok(rules)
    }
}

fn value_as_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_rules_skip_missing_values() {
        for rule in [
            InputValidationRule::email(),
            InputValidationRule::min_length(3),
            InputValidationRule::minimum(1.0),
        ] {
            assert!(rule.check(None).is_ok(), "{}", rule.name());
            assert!(rule.check(Some("  ")).is_ok(), "{}", rule.name());
        }
        assert_eq!(InputValidationRule::required().check(Some(" ")), Err("is required".into()));
    }

    #[test]
    fn builtin_rules() {
        assert!(InputValidationRule::max_length(3).check(Some("abcd")).is_err());
        assert!(InputValidationRule::one_of(["a", "b"]).check(Some("c")).is_err());
        assert!(InputValidationRule::one_of(["a", "b"]).check(Some("b")).is_ok());
        assert!(InputValidationRule::maximum(10.0).check(Some("10.5")).is_err());
        assert_eq!(InputValidationRule::minimum(0.0).check(Some("x")), Err("must be a number".into()));
        assert!(InputValidationRule::uuid()
            .check(Some("67e55044-10b1-426f-9247-bb680e5fe0c8"))
            .is_ok());
        let rule = InputValidationRule::pattern("^[a-z]+$").unwrap();
        assert!(rule.check(Some("abc")).is_ok());
        assert!(rule.check(Some("ABC")).is_err());
    }

    #[test]
    fn rule_config_expands_in_order() {
        let cfg: RuleConfig = serde_json::from_value(serde_json::json!({
            "required": true,
            "format": "email",
            "max_length": 120,
            "allowed": ["a@b.c", 7]
        }))
        .unwrap();
        let rules = cfg.to_rules("email").unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["required", "email", "max_length", "one_of"]);
        assert!(rules[3].check(Some("7")).is_ok());
    }

    #[test]
    fn rule_config_rejects_bad_pattern() {
        let cfg = RuleConfig {
            pattern: Some("(".into()),
            ..Default::default()
        };
        let err = cfg.to_rules("code").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRule { ref column, .. } if column == "code"));
    }
}
