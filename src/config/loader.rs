//! Load resource definitions from JSON files and turn them into resources.

use crate::config::{validate, ResourceDefinition};
use crate::dao::ResourceDao;
use crate::error::{AdminError, ConfigError};
use crate::registry::ResourceRegistry;
use crate::resource::Resource;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Deserialize)]
#[serde(untagged)]
enum DefinitionFile {
    Many(Vec<ResourceDefinition>),
    One(ResourceDefinition),
}

/// Parses one file's content: a single definition or an array of them.
pub fn parse_definitions(json: &str) -> Result<Vec<ResourceDefinition>, ConfigError> {
    let file: DefinitionFile = serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))?;
    Ok(match file {
        DefinitionFile::Many(defs) => defs,
        DefinitionFile::One(def) => vec![def],
    })
}

/// Reads every `*.json` file in `dir` (sorted by name) and validates the combined set.
pub async fn load_from_path(dir: impl AsRef<Path>) -> Result<Vec<ResourceDefinition>, ConfigError> {
    let dir = dir.as_ref();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", dir.display(), e)))?;
    let mut paths: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", dir.display(), e)))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut definitions = Vec::new();
    for path in &paths {
        tracing::debug!(path = %path.display(), "loading resource definitions");
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        let defs = parse_definitions(&content).map_err(|e| match e {
            ConfigError::Load(msg) => ConfigError::Load(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        definitions.extend(defs);
    }
    validate(&definitions)?;
    tracing::info!(files = paths.len(), resources = definitions.len(), "resource definitions loaded");
    Ok(definitions)
}

/// Builds one resource. Declared columns take precedence; otherwise the DAO's schema is read.
/// The DAO, when given, is attached to the resource.
pub async fn build_resource(
    definition: &ResourceDefinition,
    dao: Option<Arc<dyn ResourceDao>>,
) -> Result<Resource, AdminError> {
    let columns = match (definition.declared_columns(), &dao) {
        (Some(columns), _) => columns,
        (None, Some(dao)) => dao.column_definitions().await?,
        (None, None) => {
            return Err(ConfigError::Load(format!(
                "{}: no columns declared and no data source to read them from",
                definition.table
            ))
            .into())
        }
    };
    let mut builder = definition.configure(columns)?;
    if let Some(dao) = dao {
        builder.dao(dao);
    }
    Ok(builder.build())
}

/// Builds and registers every definition. `dao_for` supplies the data source per definition.
pub async fn build_registry<F>(
    definitions: &[ResourceDefinition],
    mut dao_for: F,
) -> Result<ResourceRegistry, AdminError>
where
    F: FnMut(&ResourceDefinition) -> Option<Arc<dyn ResourceDao>>,
{
    let mut registry = ResourceRegistry::new();
    for def in definitions {
        let resource = build_resource(def, dao_for(def)).await?;
        registry.register(resource)?;
    }
    Ok(registry)
}
