use crate::column::ColumnValueTransformer;
use crate::error::ConfigError;
use crate::resource::Resource;

/// Configures which columns are shown on the index page of a resource.
pub struct IndexBuilder<'a> {
    resource: &'a mut Resource,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(resource: &'a mut Resource) -> Self {
        IndexBuilder { resource }
    }

    /// Adds a column to the index page verbatim.
    ///
    /// Unlike form inputs, the name is not checked against the resource's columns,
    /// so a misspelled column only shows up when the page is rendered.
    pub fn column(&mut self, id: &str) -> &mut Self {
        self.resource.add_column(id);
        self
    }

    /// Adds a known column with a display transformer. Fails if the column does not exist.
    pub fn column_with(&mut self, id: &str, transformer: ColumnValueTransformer) -> Result<&mut Self, ConfigError> {
        self.resource.add_column_with_transformer(id, transformer)?;
        Ok(self)
    }
}
