//! Scatter/gather coordinator for inventory requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use analyzers_inventory_sdk::{
    AggregatedResponse, ClusterMembership, FailureKind, NODE_ANALYZERS_ACTION, NodeFailure,
    NodeFilter, NodeInfo,
};
use bytes::Bytes;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::{AnalyzersInventoryConfig, ConfigError};
use crate::domain::error::DomainError;
use crate::infra::transport::NodeTransport;
use crate::infra::wire::{self, NodeReply, NodesRequest, WireError};

type NodeOutcome = Result<NodeInfo, NodeFailure>;

/// Per-node limits copied into every collection task.
#[derive(Debug, Clone, Copy)]
struct NodeLimits {
    timeout: Duration,
    max_payload_bytes: usize,
}

/// Fans an inventory request out to the selected nodes and merges the
/// outcomes.
///
/// Nodes are queried concurrently and independently. A node that fails,
/// answers with garbage or exceeds its budget only affects its own entry.
/// When the overall deadline passes, every node still outstanding is
/// recorded as a timeout and the response completes.
pub struct RequestDispatcher {
    membership: Arc<dyn ClusterMembership>,
    transport: Arc<dyn NodeTransport>,
    config: AnalyzersInventoryConfig,
}

impl RequestDispatcher {
    /// # Errors
    /// Returns `ConfigError::Invalid` if `config` fails validation.
    pub fn new(
        membership: Arc<dyn ClusterMembership>,
        transport: Arc<dyn NodeTransport>,
        config: AnalyzersInventoryConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            membership,
            transport,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AnalyzersInventoryConfig {
        &self.config
    }

    /// Collects the inventory of every node selected by `filter`.
    ///
    /// Per-node failures never make this fail; a response where every node
    /// failed is still a successful dispatch.
    ///
    /// # Errors
    /// Returns `DomainError::Serialization` if the request envelope cannot
    /// be encoded.
    #[instrument(skip(self))]
    pub async fn dispatch(&self, filter: &NodeFilter) -> Result<AggregatedResponse, DomainError> {
        let started = Instant::now();
        let deadline = started + self.config.request_timeout;
        let cluster_name = self.membership.cluster_name();
        let live_nodes = self.membership.live_nodes();

        let unknown = filter.unknown_ids(&live_nodes);
        if !unknown.is_empty() {
            debug!(unknown = ?unknown, "Ignoring node ids that are not part of the cluster");
        }

        let targets = filter.resolve(&live_nodes);
        if targets.is_empty() {
            debug!("No nodes matched the filter");
            return Ok(AggregatedResponse::new(cluster_name, Vec::new(), Vec::new()));
        }

        let request = wire::encode_nodes_request(&NodesRequest::new(
            NODE_ANALYZERS_ACTION,
            targets.iter().map(String::as_str),
        ))?;
        let limits = NodeLimits {
            timeout: self.config.node_timeout,
            max_payload_bytes: self.config.max_wire_payload_bytes,
        };

        let mut tasks = JoinSet::new();
        for node_id in &targets {
            let transport = Arc::clone(&self.transport);
            let request = request.clone();
            let node_id = node_id.clone();
            tasks.spawn(async move {
                let outcome = query_node(transport.as_ref(), &node_id, request, limits).await;
                (node_id, outcome)
            });
        }

        let (mut outcomes, deadline_elapsed) = gather(&mut tasks, deadline, targets.len()).await;

        let mut nodes = Vec::with_capacity(targets.len());
        let mut failures = Vec::new();
        for node_id in targets {
            match outcomes.remove(&node_id) {
                Some(Ok(info)) => nodes.push(info),
                Some(Err(failure)) => failures.push(failure),
                None if deadline_elapsed => {
                    warn!(node_id = %node_id, "Node did not answer before the request deadline");
                    failures.push(NodeFailure::new(
                        node_id,
                        FailureKind::Timeout,
                        format!(
                            "no reply before the request deadline of {}",
                            humantime::format_duration(self.config.request_timeout)
                        ),
                    ));
                }
                None => failures.push(NodeFailure::new(
                    node_id,
                    FailureKind::CollectionFailure,
                    "collection task aborted",
                )),
            }
        }

        let response = AggregatedResponse::new(cluster_name, nodes, failures);
        info!(
            total = response.total(),
            successful = response.successful(),
            failed = response.failed(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Node analyzers dispatch completed"
        );
        Ok(response)
    }
}

/// Drains finished tasks until all are done or `deadline` passes. Returns the
/// outcomes and whether the deadline cut collection short.
async fn gather(
    tasks: &mut JoinSet<(String, NodeOutcome)>,
    deadline: Instant,
    expected: usize,
) -> (HashMap<String, NodeOutcome>, bool) {
    let mut outcomes = HashMap::with_capacity(expected);
    loop {
        match tokio::time::timeout_at(deadline, tasks.join_next()).await {
            Ok(Some(Ok((node_id, outcome)))) => {
                if let Err(failure) = &outcome {
                    warn!(
                        node_id = %node_id,
                        kind = %failure.kind(),
                        reason = %failure.reason(),
                        "Node produced no inventory"
                    );
                }
                outcomes.insert(node_id, outcome);
            }
            Ok(Some(Err(e))) => {
                warn!(error = %e, "Node collection task did not complete");
            }
            Ok(None) => return (outcomes, false),
            Err(_) => {
                tasks.abort_all();
                return (outcomes, true);
            }
        }
    }
}

/// Queries one node within its own budget and classifies the outcome.
async fn query_node(
    transport: &dyn NodeTransport,
    node_id: &str,
    request: Bytes,
    limits: NodeLimits,
) -> NodeOutcome {
    let reply = match tokio::time::timeout(limits.timeout, transport.send(node_id, request)).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => {
            return Err(NodeFailure::new(node_id, FailureKind::Unreachable, e.to_string()));
        }
        Err(_) => {
            return Err(NodeFailure::new(
                node_id,
                FailureKind::Timeout,
                format!(
                    "no reply within {}",
                    humantime::format_duration(limits.timeout)
                ),
            ));
        }
    };

    if reply.len() > limits.max_payload_bytes {
        let e = WireError::PayloadTooLarge {
            size: reply.len(),
            limit: limits.max_payload_bytes,
        };
        return Err(NodeFailure::new(node_id, FailureKind::Serialization, e.to_string()));
    }

    match wire::decode_node_reply(&reply) {
        Ok(NodeReply::Info(info)) if info.node_id() == node_id => Ok(info),
        Ok(NodeReply::Info(info)) => Err(NodeFailure::new(
            node_id,
            FailureKind::Serialization,
            format!("reply identifies node '{}'", info.node_id()),
        )),
        Ok(NodeReply::Failure(reason)) => Err(NodeFailure::new(
            node_id,
            FailureKind::CollectionFailure,
            reason,
        )),
        Err(e) => Err(NodeFailure::new(node_id, FailureKind::Serialization, e.to_string())),
    }
}
