//! Explicit registry of installed analysis plugins.

use std::collections::BTreeMap;
use std::sync::Arc;

use analyzers_inventory_sdk::{
    AnalysisPlugin, AnalysisPluginSource, IntrospectionError, RegisteredPlugin,
};
use parking_lot::RwLock;

use crate::domain::error::DomainError;

/// Plugins keyed by the stable identifier supplied at registration time.
///
/// Re-registering an identifier replaces the previous plugin.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<BTreeMap<String, Arc<dyn AnalysisPlugin>>>,
}

impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `plugin` under `id`, returning the plugin it replaced.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPlugin` if `id` is blank.
    pub fn register(
        &self,
        id: impl Into<String>,
        plugin: Arc<dyn AnalysisPlugin>,
    ) -> Result<Option<Arc<dyn AnalysisPlugin>>, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidPlugin(
                "plugin identifier must not be empty".to_owned(),
            ));
        }

        let replaced = self.plugins.write().insert(id.clone(), plugin);
        if replaced.is_some() {
            tracing::warn!(plugin_id = %id, "Analysis plugin re-registered, previous one replaced");
        } else {
            tracing::debug!(plugin_id = %id, "Registered analysis plugin");
        }
        Ok(replaced)
    }

    /// Removes a plugin; returns whether it was present.
    #[must_use]
    pub fn unregister(&self, id: &str) -> bool {
        self.plugins.write().remove(id).is_some()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.plugins.read().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }
}

impl AnalysisPluginSource for PluginRegistry {
    fn analysis_plugins(&self) -> Result<Vec<RegisteredPlugin>, IntrospectionError> {
        Ok(self
            .plugins
            .read()
            .iter()
            .map(|(id, plugin)| RegisteredPlugin {
                id: id.clone(),
                plugin: Arc::clone(plugin),
            })
            .collect())
    }
}
