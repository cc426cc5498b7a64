//! Node transport: how the coordinating node reaches a target node, and how
//! the target node answers.

use std::collections::HashMap;
use std::sync::Arc;

use analyzers_inventory_sdk::NODE_ANALYZERS_ACTION;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::domain::collector::NodeCollector;
use crate::infra::wire::{self, NodeReply, NodesRequest, WireError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("node '{0}' is not connected")]
    UnknownNode(String),

    #[error("node '{node_id}' could not answer: {reason}")]
    Remote { node_id: String, reason: String },
}

/// Delivers an encoded request to one node and returns its encoded reply.
#[async_trait]
pub trait NodeTransport: Send + Sync {
    /// # Errors
    /// Returns `TransportError` if the node cannot be reached.
    async fn send(&self, node_id: &str, request: Bytes) -> Result<Bytes, TransportError>;
}

/// Node-side entry point of the inventory action.
pub struct NodeRequestHandler {
    collector: Arc<NodeCollector>,
}

impl NodeRequestHandler {
    #[must_use]
    pub fn new(collector: Arc<NodeCollector>) -> Self {
        Self { collector }
    }

    #[must_use]
    pub fn node_id(&self) -> &str {
        self.collector.node_id()
    }

    /// Answers one request. Decode and collection problems are encoded as a
    /// failure reply rather than returned, so the coordinator always learns
    /// why this node has no inventory.
    ///
    /// # Errors
    /// Returns `WireError` only if the reply itself cannot be encoded.
    #[instrument(skip_all, fields(node_id = %self.node_id()))]
    pub fn handle(&self, request: &[u8]) -> Result<Bytes, WireError> {
        let reply = match Self::accept(request) {
            Ok(req) if !req.node_ids.contains(self.node_id()) => {
                NodeReply::Failure(format!("node '{}' was not targeted", self.node_id()))
            }
            Ok(_) => match self.collector.collect() {
                Ok(info) => NodeReply::Info(info),
                Err(e) => NodeReply::Failure(e.to_string()),
            },
            Err(e) => {
                debug!(error = %e, "Rejected malformed inventory request");
                NodeReply::Failure(format!("malformed request: {e}"))
            }
        };
        wire::encode_node_reply(&reply)
    }

    fn accept(request: &[u8]) -> Result<NodesRequest, WireError> {
        let request = wire::decode_nodes_request(request)?;
        if request.action != NODE_ANALYZERS_ACTION {
            return Err(WireError::UnexpectedAction(request.action));
        }
        Ok(request)
    }
}

/// In-process transport routing requests to registered node handlers.
#[derive(Default)]
pub struct LocalTransport {
    handlers: RwLock<HashMap<String, Arc<NodeRequestHandler>>>,
}

impl LocalTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handler: Arc<NodeRequestHandler>) {
        let node_id = handler.node_id().to_owned();
        self.handlers.write().insert(node_id, handler);
    }

    #[must_use]
    pub fn disconnect(&self, node_id: &str) -> bool {
        self.handlers.write().remove(node_id).is_some()
    }
}

#[async_trait]
impl NodeTransport for LocalTransport {
    async fn send(&self, node_id: &str, request: Bytes) -> Result<Bytes, TransportError> {
        let handler = self
            .handlers
            .read()
            .get(node_id)
            .cloned()
            .ok_or_else(|| TransportError::UnknownNode(node_id.to_owned()))?;

        handler
            .handle(&request)
            .map_err(|e| TransportError::Remote {
                node_id: node_id.to_owned(),
                reason: e.to_string(),
            })
    }
}
