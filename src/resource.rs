//! Resource: top-level configuration for one table managed through the admin panel.

use crate::column::{ColumnDefinition, ColumnValueTransformer, InputTransformer, InputValidationRule};
use crate::dao::ResourceDao;
use crate::elements::PageElement;
use crate::error::{ConfigError, FieldError};
use crate::form::FormPostEntry;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_PER_PAGE_COUNT: usize = 20;

/// Resource-level validation hook, run before or after the per-column rules.
pub type ValidationFunction = Arc<dyn Fn(&Resource, &FormPostEntry) -> Vec<FieldError> + Send + Sync>;

pub struct Resource {
    table_name: String,
    /// Column names shown on the index page.
    index_columns: Vec<String>,
    /// Elements shown on the create and edit pages.
    form_page: Vec<PageElement>,
    column_definitions: Vec<ColumnDefinition>,
    dao: Option<Arc<dyn ResourceDao>>,
    per_page_count: usize,
    before_validation: Option<ValidationFunction>,
    after_validation: Option<ValidationFunction>,
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("table_name", &self.table_name)
            .field("index_columns", &self.index_columns)
            .field("form_page", &self.form_page)
            .field("column_definitions", &self.column_definitions)
            .field("has_dao", &self.dao.is_some())
            .field("per_page_count", &self.per_page_count)
            .finish_non_exhaustive()
    }
}

impl Resource {
    pub fn new(table_name: impl Into<String>) -> Result<Self, ConfigError> {
        let table_name = table_name.into();
        if table_name.trim().is_empty() {
            return Err(ConfigError::EmptyTableName);
        }
        Ok(Resource {
            table_name,
            index_columns: Vec::new(),
            form_page: Vec::new(),
            column_definitions: Vec::new(),
            dao: None,
            per_page_count: DEFAULT_PER_PAGE_COUNT,
            before_validation: None,
            after_validation: None,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn index_columns(&self) -> &[String] {
        &self.index_columns
    }

    pub fn form_page(&self) -> &[PageElement] {
        &self.form_page
    }

    pub fn column_definitions(&self) -> &[ColumnDefinition] {
        &self.column_definitions
    }

    /// Replaces all column definitions. Names must be unique.
    pub fn set_column_definitions(&mut self, columns: Vec<ColumnDefinition>) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for c in &columns {
            if !seen.insert(c.name()) {
                return Err(ConfigError::DuplicateColumn {
                    column: c.name().to_string(),
                    table: self.table_name.clone(),
                });
            }
        }
        self.column_definitions = columns;
        Ok(())
    }

    pub fn dao(&self) -> Option<&Arc<dyn ResourceDao>> {
        self.dao.as_ref()
    }

    pub fn set_dao(&mut self, dao: Arc<dyn ResourceDao>) {
        self.dao = Some(dao);
    }

    /// Names of the key columns, in definition order.
    pub fn primary_keys(&self) -> Vec<String> {
        self.column_definitions
            .iter()
            .filter(|c| c.is_key_column())
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Names of the columns accepted from user submissions.
    pub fn editable_columns(&self) -> HashSet<String> {
        self.column_definitions
            .iter()
            .filter(|c| c.is_editable())
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn find_column_definition_by_name(&self, name: &str) -> Option<&ColumnDefinition> {
        self.column_definitions.iter().find(|c| c.name() == name)
    }

    pub fn find_column_definition_by_name_mut(&mut self, name: &str) -> Option<&mut ColumnDefinition> {
        self.column_definitions.iter_mut().find(|c| c.name() == name)
    }

    fn require_column_mut(&mut self, name: &str) -> Result<&mut ColumnDefinition, ConfigError> {
        let table = &self.table_name;
        self.column_definitions
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| ConfigError::unknown_column(name, table))
    }

    /// Marks the column as editable.
    pub fn add_editable_column(&mut self, name: &str) -> Result<(), ConfigError> {
        self.require_column_mut(name)?.set_editable(true);
        Ok(())
    }

    /// Marks the column as editable and appends validation rules for its input.
    pub fn add_editable_column_with_rules<I>(&mut self, name: &str, rules: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = InputValidationRule>,
    {
        self.require_column_mut(name)?
            .set_editable(true)
            .add_validation_rules(rules);
        Ok(())
    }

    /// Marks the column as editable and replaces its input transformer.
    pub fn add_editable_column_with_transformer(
        &mut self,
        name: &str,
        transformer: InputTransformer,
    ) -> Result<(), ConfigError> {
        self.require_column_mut(name)?
            .set_editable(true)
            .set_input_transformer(transformer);
        Ok(())
    }

    pub fn add_editable_column_with<I>(
        &mut self,
        name: &str,
        transformer: InputTransformer,
        rules: I,
    ) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = InputValidationRule>,
    {
        self.require_column_mut(name)?
            .set_editable(true)
            .add_validation_rules(rules)
            .set_input_transformer(transformer);
        Ok(())
    }

    /// Appends a column to the index page. The name is not checked against the schema.
    pub fn add_column(&mut self, column_id: impl Into<String>) {
        self.index_columns.push(column_id.into());
    }

    /// Appends a known column to the index page and sets how its values are displayed.
    pub fn add_column_with_transformer(
        &mut self,
        column_id: &str,
        transformer: ColumnValueTransformer,
    ) -> Result<(), ConfigError> {
        self.require_column_mut(column_id)?
            .set_column_value_transformer(transformer);
        self.index_columns.push(column_id.to_string());
        Ok(())
    }

    pub fn push_form_element(&mut self, element: PageElement) {
        self.form_page.push(element);
    }

    pub fn per_page_count(&self) -> usize {
        self.per_page_count
    }

    pub fn set_per_page_count(&mut self, per_page_count: usize) -> Result<(), ConfigError> {
        if per_page_count == 0 {
            return Err(ConfigError::InvalidPerPageCount {
                table: self.table_name.clone(),
            });
        }
        self.per_page_count = per_page_count;
        Ok(())
    }

    pub fn before_validation(&self) -> Option<&ValidationFunction> {
        self.before_validation.as_ref()
    }

    pub fn set_before_validation(&mut self, f: ValidationFunction) {
        self.before_validation = Some(f);
    }

    pub fn after_validation(&self) -> Option<&ValidationFunction> {
        self.after_validation.as_ref()
    }

    pub fn set_after_validation(&mut self, f: ValidationFunction) {
        self.after_validation = Some(f);
    }
}
