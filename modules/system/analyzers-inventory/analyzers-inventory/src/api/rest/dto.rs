use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response body of `GET /_nodes/analyzers` and `GET /_nodes/{nodeId}/analyzers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodesAnalyzersDto {
    pub nodes: BTreeMap<String, NodeAnalyzersDto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<NodeFailureDto>,
}

/// Body plus the cluster header a host prepends to nodes-level responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodesAnalyzersEnvelopeDto {
    #[serde(rename = "_nodes")]
    pub header: NodesHeaderDto,
    pub cluster_name: String,
    #[serde(flatten)]
    pub body: NodesAnalyzersDto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodesHeaderDto {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAnalyzersDto {
    pub analyzers: Vec<String>,
    pub tokenizers: Vec<String>,
    pub token_filters: Vec<String>,
    pub char_filters: Vec<String>,
    pub normalizers: Vec<String>,
    /// Sorted by plugin name.
    pub plugins: Vec<PluginComponentsDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginComponentsDto {
    pub name: String,
    pub analyzers: Vec<String>,
    pub tokenizers: Vec<String>,
    pub token_filters: Vec<String>,
    pub char_filters: Vec<String>,
    pub hunspell_dictionaries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFailureDto {
    pub node_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: String,
}
