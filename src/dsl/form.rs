use crate::column::{ColumnDefinition, ColumnType, InputTransformer};
use crate::elements::{FormInput, FormInputGroup, FormSelect, PageElement, Paragraph, SelectOption};
use crate::error::ConfigError;
use crate::resource::Resource;
use std::sync::Arc;

/// Adds elements to the form (create and edit) page of a resource.
pub struct FormBuilder<'a> {
    resource: &'a mut Resource,
}

impl<'a> FormBuilder<'a> {
    pub fn new(resource: &'a mut Resource) -> Self {
        FormBuilder { resource }
    }

    pub fn paragraph(&mut self, text: impl Into<String>) -> &mut Self {
        self.resource
            .push_form_element(PageElement::Paragraph(Paragraph { text: text.into() }));
        self
    }

    /// Builds a group of inputs with `f` and appends it to the form once `f` succeeds.
    /// Columns are marked editable only then, so a failed group leaves the resource untouched.
    /// An empty header renders the group without a title.
    pub fn input_group<F>(&mut self, header: &str, f: F) -> Result<&mut Self, ConfigError>
    where
        F: FnOnce(&mut InputGroupBuilder<'_>) -> Result<(), ConfigError>,
    {
        let header = Some(header.to_string()).filter(|h| !h.is_empty());
        let mut builder = InputGroupBuilder::new(FormInputGroup::new(header), &*self.resource);
        f(&mut builder)?;
        let (group, editable) = builder.finish();
        for (column, transformer) in editable {
            match transformer {
                Some(t) => self.resource.add_editable_column_with_transformer(&column, t)?,
                None => self.resource.add_editable_column(&column)?,
            }
        }
        self.resource.push_form_element(PageElement::FormInputGroup(group));
        Ok(self)
    }
}

/// Adds input fields to one group, checking each column against the resource.
pub struct InputGroupBuilder<'a> {
    group: FormInputGroup,
    resource: &'a Resource,
    /// Columns to mark editable once the group is complete.
    editable: Vec<(String, Option<InputTransformer>)>,
}

impl<'a> InputGroupBuilder<'a> {
    pub fn new(group: FormInputGroup, resource: &'a Resource) -> Self {
        InputGroupBuilder {
            group,
            resource,
            editable: Vec::new(),
        }
    }

    /// Adds an input field for the column and marks the column editable.
    pub fn input(&mut self, column: &str) -> Result<&mut Self, ConfigError> {
        self.push_input(column, None)
    }

    /// Adds an input field whose submitted value is converted by `transformer`.
    pub fn input_with(&mut self, column: &str, transformer: InputTransformer) -> Result<&mut Self, ConfigError> {
        self.push_input(column, Some(transformer))
    }

    fn push_input(&mut self, column: &str, transformer: Option<InputTransformer>) -> Result<&mut Self, ConfigError> {
        let column_type = self.type_for_column(column)?;
        self.group.add_input(FormInput {
            column: column.to_string(),
            column_type,
        });
        self.editable.push((column.to_string(), transformer));
        Ok(self)
    }

    /// Adds a select field whose options are produced by `options` on every render.
    /// The column is not marked editable; pair it with [`ResourceBuilder::editable`](crate::dsl::ResourceBuilder::editable)
    /// to accept the submitted value. Produced values are not checked against the column type.
    pub fn select<F>(&mut self, column: &str, options: F) -> Result<&mut Self, ConfigError>
    where
        F: Fn() -> Vec<SelectOption> + Send + Sync + 'static,
    {
        let column_type = self.type_for_column(column)?;
        self.group
            .add_select(FormSelect::new(column, column_type, Arc::new(options)));
        Ok(self)
    }

    /// First column definition with this name wins.
    fn type_for_column(&self, column: &str) -> Result<ColumnType, ConfigError> {
        self.resource
            .column_definitions()
            .iter()
            .find(|c| c.name() == column)
            .map(ColumnDefinition::column_type)
            .ok_or_else(|| ConfigError::unknown_column(column, self.resource.table_name()))
    }

    /// The finished group and the columns it makes editable.
    pub fn finish(self) -> (FormInputGroup, Vec<(String, Option<InputTransformer>)>) {
        (self.group, self.editable)
    }
}
