use std::sync::Arc;

use analyzers_inventory_sdk::{
    AnalysisPluginSource, ComponentInventory, ComponentRegistry, NodeInfo, PluginComponents,
};
use tracing::{debug, instrument, warn};

use crate::domain::error::DomainError;

/// Builds the inventory snapshot of the local node.
///
/// Holds no state between invocations, so one collector can serve any
/// number of concurrent requests.
pub struct NodeCollector {
    node_id: String,
    registry: Arc<dyn ComponentRegistry>,
    plugins: Arc<dyn AnalysisPluginSource>,
}

impl NodeCollector {
    #[must_use]
    pub fn new(
        node_id: impl Into<String>,
        registry: Arc<dyn ComponentRegistry>,
        plugins: Arc<dyn AnalysisPluginSource>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            registry,
            plugins,
        }
    }

    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Reads the component registry and every installed analysis plugin.
    ///
    /// # Errors
    /// Returns `DomainError::CollectionFailed` if the registry or the plugin
    /// enumeration is unavailable, or a plugin has a blank identifier.
    #[instrument(skip(self), fields(node_id = %self.node_id))]
    pub fn collect(&self) -> Result<NodeInfo, DomainError> {
        self.collect_snapshot().map_err(|e| {
            warn!(error = %e, "Failed to collect analysis components");
            e
        })
    }

    fn collect_snapshot(&self) -> Result<NodeInfo, DomainError> {
        let inventory = ComponentInventory::new()
            .with_analyzers(self.registry.analyzer_names()?)
            .with_tokenizers(self.registry.tokenizer_names()?)
            .with_token_filters(self.registry.token_filter_names()?)
            .with_char_filters(self.registry.char_filter_names()?)
            .with_normalizers(self.registry.normalizer_names()?);

        let registered = self.plugins.analysis_plugins()?;
        let mut plugins = Vec::with_capacity(registered.len());
        for entry in registered {
            if entry.id.trim().is_empty() {
                return Err(DomainError::CollectionFailed(
                    "analysis plugin enumerated without an identifier".to_owned(),
                ));
            }
            let plugin = &entry.plugin;
            plugins.push(
                PluginComponents::new(entry.id.as_str())
                    .with_analyzers(plugin.analyzers())
                    .with_tokenizers(plugin.tokenizers())
                    .with_token_filters(plugin.token_filters())
                    .with_char_filters(plugin.char_filters())
                    .with_hunspell_dictionaries(plugin.hunspell_dictionaries()),
            );
        }

        let info = NodeInfo::new(self.node_id.as_str(), inventory, plugins);
        debug!(
            analyzers = info.inventory().analyzers().len(),
            tokenizers = info.inventory().tokenizers().len(),
            plugins = info.plugins().len(),
            "Collected analysis components"
        );
        Ok(info)
    }
}
