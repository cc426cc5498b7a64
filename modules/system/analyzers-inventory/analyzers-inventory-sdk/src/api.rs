//! Public API trait for the analyzers inventory module.

use async_trait::async_trait;

use crate::error::AnalyzersInventoryError;
use crate::filter::NodeFilter;
use crate::models::AggregatedResponse;

/// Cluster-wide inventory of text-analysis components.
///
/// ```ignore
/// let filter = NodeFilter::parse(path_param)?;
/// let response = client.node_analyzers(&filter).await?;
/// ```
#[async_trait]
pub trait AnalyzersInventoryClient: Send + Sync {
    /// Collects the inventory of every node selected by `filter`.
    ///
    /// Nodes that fail, time out or answer with garbage are reported in
    /// [`AggregatedResponse::failures`]; that is not an error.
    ///
    /// # Errors
    ///
    /// - `Internal` if the dispatch itself could not be started
    async fn node_analyzers(
        &self,
        filter: &NodeFilter,
    ) -> Result<AggregatedResponse, AnalyzersInventoryError>;
}
