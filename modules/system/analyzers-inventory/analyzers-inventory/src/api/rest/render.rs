//! Deterministic JSON rendering of aggregated responses.
//!
//! Node entries are keyed by node id in ascending order, every name array
//! is sorted and plugins are an array of records sorted by plugin name, so
//! the same response always renders to the same bytes.

use analyzers_inventory_sdk::AggregatedResponse;

use super::dto::{NodesAnalyzersDto, NodesAnalyzersEnvelopeDto};

/// Renders the `{"nodes": {...}}` body; failures follow under `"failures"`
/// when there are any.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render(response: &AggregatedResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string(&NodesAnalyzersDto::from(response))
}

/// Same as [`render`], indented for humans.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render_pretty(response: &AggregatedResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&NodesAnalyzersDto::from(response))
}

/// Renders the body preceded by the `_nodes` summary and `cluster_name`.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render_with_header(response: &AggregatedResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string(&NodesAnalyzersEnvelopeDto::from(response))
}
