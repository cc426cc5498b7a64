//! Local client implementing the `AnalyzersInventoryClient` trait.

use std::sync::Arc;

use analyzers_inventory_sdk::{
    AggregatedResponse, AnalyzersInventoryClient, AnalyzersInventoryError, NodeFilter,
};
use async_trait::async_trait;

use crate::domain::RequestDispatcher;

/// Local client for the analyzers inventory module.
///
/// Delegates to the dispatcher of the coordinating node.
pub struct AnalyzersInventoryLocalClient {
    dispatcher: Arc<RequestDispatcher>,
}

impl AnalyzersInventoryLocalClient {
    #[must_use]
    pub fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl AnalyzersInventoryClient for AnalyzersInventoryLocalClient {
    async fn node_analyzers(
        &self,
        filter: &NodeFilter,
    ) -> Result<AggregatedResponse, AnalyzersInventoryError> {
        self.dispatcher
            .dispatch(filter)
            .await
            .map_err(AnalyzersInventoryError::from)
    }
}
