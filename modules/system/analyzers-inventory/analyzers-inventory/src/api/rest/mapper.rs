use std::collections::BTreeSet;

use analyzers_inventory_sdk::{AggregatedResponse, NodeFailure, NodeInfo, PluginComponents};

use super::dto::{
    NodeAnalyzersDto, NodeFailureDto, NodesAnalyzersDto, NodesAnalyzersEnvelopeDto,
    NodesHeaderDto, PluginComponentsDto,
};

fn names(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

impl From<&PluginComponents> for PluginComponentsDto {
    fn from(plugin: &PluginComponents) -> Self {
        Self {
            name: plugin.name().to_owned(),
            analyzers: names(plugin.analyzers()),
            tokenizers: names(plugin.tokenizers()),
            token_filters: names(plugin.token_filters()),
            char_filters: names(plugin.char_filters()),
            hunspell_dictionaries: names(plugin.hunspell_dictionaries()),
        }
    }
}

impl From<&NodeInfo> for NodeAnalyzersDto {
    fn from(info: &NodeInfo) -> Self {
        let inventory = info.inventory();
        let mut plugins: Vec<PluginComponentsDto> =
            info.plugins().values().map(Into::into).collect();
        plugins.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            analyzers: names(inventory.analyzers()),
            tokenizers: names(inventory.tokenizers()),
            token_filters: names(inventory.token_filters()),
            char_filters: names(inventory.char_filters()),
            normalizers: names(inventory.normalizers()),
            plugins,
        }
    }
}

impl From<&NodeFailure> for NodeFailureDto {
    fn from(failure: &NodeFailure) -> Self {
        Self {
            node_id: failure.node_id().to_owned(),
            kind: failure.kind().as_str().to_owned(),
            reason: failure.reason().to_owned(),
        }
    }
}

impl From<&AggregatedResponse> for NodesAnalyzersDto {
    fn from(response: &AggregatedResponse) -> Self {
        Self {
            nodes: response
                .nodes()
                .iter()
                .map(|info| (info.node_id().to_owned(), info.into()))
                .collect(),
            failures: response.failures().iter().map(Into::into).collect(),
        }
    }
}

impl From<&AggregatedResponse> for NodesAnalyzersEnvelopeDto {
    fn from(response: &AggregatedResponse) -> Self {
        Self {
            header: NodesHeaderDto {
                total: response.total(),
                successful: response.successful(),
                failed: response.failed(),
            },
            cluster_name: response.cluster_name().to_owned(),
            body: response.into(),
        }
    }
}
