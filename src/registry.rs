//! Registry of configured resources: filled during startup, then frozen for serving.

use crate::error::ConfigError;
use crate::resource::Resource;
use std::collections::HashMap;
use std::sync::Arc;

/// Startup-time registry. Resources are keyed by table name.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<Resource>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resource: Resource) -> Result<(), ConfigError> {
        if self.resources.iter().any(|r| r.table_name() == resource.table_name()) {
            return Err(ConfigError::DuplicateResource(resource.table_name().to_string()));
        }
        tracing::debug!(table = %resource.table_name(), "resource registered");
        self.resources.push(resource);
        Ok(())
    }

    /// Ends configuration. The returned handle exposes no way to mutate a resource.
    pub fn freeze(self) -> Registry {
        let resources: Vec<Arc<Resource>> = self.resources.into_iter().map(Arc::new).collect();
        let by_table = resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.table_name().to_string(), i))
            .collect();
        tracing::info!(resources = resources.len(), "resource registry frozen");
        Registry {
            inner: Arc::new(RegistryInner { resources, by_table }),
        }
    }
}

#[derive(Debug)]
struct RegistryInner {
    /// Registration order.
    resources: Vec<Arc<Resource>>,
    by_table: HashMap<String, usize>,
}

/// Read-only registry shared with request handlers.
#[derive(Clone, Debug)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    pub fn get(&self, table_name: &str) -> Option<&Arc<Resource>> {
        self.inner
            .by_table
            .get(table_name)
            .map(|&i| &self.inner.resources[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Resource>> {
        self.inner.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_tables() {
        let mut reg = ResourceRegistry::new();
        reg.register(Resource::new("users").unwrap()).unwrap();
        let err = reg.register(Resource::new("users").unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateResource(ref t) if t == "users"));
    }

    #[test]
    fn frozen_registry_keeps_order_and_is_shared() {
        let mut reg = ResourceRegistry::new();
        for t in ["users", "posts", "tags"] {
            reg.register(Resource::new(t).unwrap()).unwrap();
        }
        let frozen = reg.freeze();
        let clone = frozen.clone();
        let order: Vec<_> = frozen.iter().map(|r| r.table_name()).collect();
        assert_eq!(order, ["users", "posts", "tags"]);
        assert_eq!(clone.get("posts").map(|r| r.table_name()), Some("posts"));
        assert!(clone.get("comments").is_none());
        assert!(Arc::ptr_eq(frozen.get("tags").unwrap(), clone.get("tags").unwrap()));
        assert_eq!(frozen.len(), 3);
    }

    #[test]
    fn frozen_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
