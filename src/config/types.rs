//! Resource definition files: the JSON form of the configuration DSL.

use crate::column::{ColumnDefinition, ColumnType, ColumnValueTransformer, InputTransformer, RuleConfig};
use crate::elements::SelectOption;
use crate::error::ConfigError;
use crate::dsl::ResourceBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub table: String,
    /// Database schema holding the table.
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default)]
    pub per_page: Option<usize>,
    /// Columns declared inline. When absent, they come from the database schema.
    #[serde(default)]
    pub columns: Option<Vec<ColumnConfig>>,
    #[serde(default)]
    pub index: Vec<IndexColumnEntry>,
    #[serde(default)]
    pub form: Vec<FormItemConfig>,
    /// Rules per column. Listing a column here also makes it editable.
    #[serde(default)]
    pub validation: BTreeMap<String, RuleConfig>,
}

fn default_schema() -> String {
    "public".into()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: ColumnType,
    #[serde(default)]
    pub key: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexColumnEntry {
    Name(String),
    Display { column: String, display: DisplayConfig },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayConfig {
    DateFormat { format: String },
    YesNo,
    Truncate { max_chars: usize },
}

impl DisplayConfig {
    pub fn to_transformer(&self) -> ColumnValueTransformer {
        match self {
            DisplayConfig::DateFormat { format } => ColumnValueTransformer::date_format(format),
            DisplayConfig::YesNo => ColumnValueTransformer::yes_no(),
            DisplayConfig::Truncate { max_chars } => ColumnValueTransformer::truncate(*max_chars),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformConfig {
    Trim,
    Lowercase,
    EmptyAsNull,
    Date { format: String },
}

impl TransformConfig {
    pub fn to_transformer(&self) -> InputTransformer {
        match self {
            TransformConfig::Trim => InputTransformer::trim(),
            TransformConfig::Lowercase => InputTransformer::lowercase(),
            TransformConfig::EmptyAsNull => InputTransformer::empty_as_null(),
            TransformConfig::Date { format } => InputTransformer::date(format),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormItemConfig {
    Paragraph(String),
    Group {
        #[serde(default)]
        header: String,
        inputs: Vec<InputConfig>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputConfig {
    Column(String),
    /// Select with a fixed list of `[value, label]` pairs.
    Select {
        select: String,
        options: Vec<(String, String)>,
    },
    Input {
        column: String,
        #[serde(default)]
        transform: Option<TransformConfig>,
    },
}

impl ResourceDefinition {
    pub fn declared_columns(&self) -> Option<Vec<ColumnDefinition>> {
        self.columns.as_ref().map(|cols| {
            cols.iter()
                .map(|c| ColumnDefinition::new(c.name.clone(), c.type_).with_key(c.key))
                .collect()
        })
    }

    /// Replays the definition through the DSL, so every column reference is checked the same way.
    pub fn configure(&self, columns: Vec<ColumnDefinition>) -> Result<ResourceBuilder, ConfigError> {
        let mut builder = ResourceBuilder::new(&self.table, columns)?;
        if let Some(n) = self.per_page {
            builder.per_page(n)?;
        }
        builder.index(|index| {
            for entry in &self.index {
                match entry {
                    IndexColumnEntry::Name(name) => {
                        index.column(name);
                    }
                    IndexColumnEntry::Display { column, display } => {
                        index.column_with(column, display.to_transformer())?;
                    }
                }
            }
            Ok(())
        })?;
        builder.form(|form| {
            for item in &self.form {
                match item {
                    FormItemConfig::Paragraph(text) => {
                        form.paragraph(text.as_str());
                    }
                    FormItemConfig::Group { header, inputs } => {
                        form.input_group(header, |group| {
                            for input in inputs {
                                match input {
                                    InputConfig::Column(column) => {
                                        group.input(column)?;
                                    }
                                    InputConfig::Select { select, options } => {
                                        let options: Vec<SelectOption> =
                                            options.iter().cloned().map(SelectOption::from).collect();
                                        group.select(select, move || options.clone())?;
                                    }
                                    InputConfig::Input { column, transform: None } => {
                                        group.input(column)?;
                                    }
                                    InputConfig::Input { column, transform: Some(t) } => {
                                        group.input_with(column, t.to_transformer())?;
                                    }
                                }
                            }
                            Ok(())
                        })?;
                    }
                }
            }
            Ok(())
        })?;
        for (column, rules) in &self.validation {
            builder.editable_with_rules(column, rules.to_rules(column)?)?;
        }
        Ok(builder)
    }
}
