use crate::column::{ColumnDefinition, InputTransformer, InputValidationRule};
use crate::dao::ResourceDao;
use crate::dsl::{FormBuilder, IndexBuilder};
use crate::error::{AdminError, ConfigError, FieldError};
use crate::form::FormPostEntry;
use crate::resource::Resource;
use crate::schema::ResourceSchemaProvider;
use std::sync::Arc;

/// Entry point of the configuration DSL. Every step fails fast on unknown columns
/// (except index columns, see [`IndexBuilder::column`]).
#[derive(Debug)]
pub struct ResourceBuilder {
    resource: Resource,
}

impl ResourceBuilder {
    pub fn new(table_name: &str, columns: Vec<ColumnDefinition>) -> Result<Self, ConfigError> {
        let mut resource = Resource::new(table_name)?;
        resource.set_column_definitions(columns)?;
        Ok(ResourceBuilder { resource })
    }

    /// Starts from the columns reported by a schema provider.
    pub async fn from_schema<P>(table_name: &str, provider: &P) -> Result<Self, AdminError>
    where
        P: ResourceSchemaProvider + ?Sized,
    {
        let columns = provider.column_definitions().await?;
        tracing::debug!(table = %table_name, columns = columns.len(), "schema loaded");
        Ok(Self::new(table_name, columns)?)
    }

    /// Starts from the DAO's schema and attaches the DAO to the resource.
    pub async fn from_dao(table_name: &str, dao: Arc<dyn ResourceDao>) -> Result<Self, AdminError> {
        let mut builder = Self::from_schema(table_name, dao.as_ref()).await?;
        builder.resource.set_dao(dao);
        Ok(builder)
    }

    pub fn index<F>(&mut self, f: F) -> Result<&mut Self, ConfigError>
    where
        F: FnOnce(&mut IndexBuilder<'_>) -> Result<(), ConfigError>,
    {
        f(&mut IndexBuilder::new(&mut self.resource))?;
        Ok(self)
    }

    pub fn form<F>(&mut self, f: F) -> Result<&mut Self, ConfigError>
    where
        F: FnOnce(&mut FormBuilder<'_>) -> Result<(), ConfigError>,
    {
        f(&mut FormBuilder::new(&mut self.resource))?;
        Ok(self)
    }

    pub fn editable(&mut self, column: &str) -> Result<&mut Self, ConfigError> {
        self.resource.add_editable_column(column)?;
        Ok(self)
    }

    pub fn editable_with_rules<I>(&mut self, column: &str, rules: I) -> Result<&mut Self, ConfigError>
    where
        I: IntoIterator<Item = InputValidationRule>,
    {
        self.resource.add_editable_column_with_rules(column, rules)?;
        Ok(self)
    }

    pub fn editable_with_transformer(
        &mut self,
        column: &str,
        transformer: InputTransformer,
    ) -> Result<&mut Self, ConfigError> {
        self.resource
            .add_editable_column_with_transformer(column, transformer)?;
        Ok(self)
    }

    pub fn per_page(&mut self, count: usize) -> Result<&mut Self, ConfigError> {
        self.resource.set_per_page_count(count)?;
        Ok(self)
    }

    pub fn before_validation<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Resource, &FormPostEntry) -> Vec<FieldError> + Send + Sync + 'static,
    {
        self.resource.set_before_validation(Arc::new(f));
        self
    }

    pub fn after_validation<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Resource, &FormPostEntry) -> Vec<FieldError> + Send + Sync + 'static,
    {
        self.resource.set_after_validation(Arc::new(f));
        self
    }

    pub fn dao(&mut self, dao: Arc<dyn ResourceDao>) -> &mut Self {
        self.resource.set_dao(dao);
        self
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn build(self) -> Resource {
        let resource = self.resource;
        if resource.dao().is_some() && resource.primary_keys().is_empty() {
            tracing::warn!(
                table = %resource.table_name(),
                "resource has no key columns; edit and delete will not work"
            );
        }
        tracing::info!(
            table = %resource.table_name(),
            index_columns = resource.index_columns().len(),
            form_elements = resource.form_page().len(),
            "resource configured"
        );
        resource
    }
}
