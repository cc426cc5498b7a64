use analyzers_inventory_sdk::ClusterMembership;
use parking_lot::RwLock;

/// Fixed cluster view, for single-process deployments and tests.
pub struct StaticMembership {
    cluster_name: String,
    nodes: RwLock<Vec<String>>,
}

impl StaticMembership {
    #[must_use]
    pub fn new<I, S>(cluster_name: impl Into<String>, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cluster_name: cluster_name.into(),
            nodes: RwLock::new(nodes.into_iter().map(Into::into).collect()),
        }
    }

    pub fn join(&self, node_id: impl Into<String>) {
        let node_id = node_id.into();
        let mut nodes = self.nodes.write();
        if !nodes.contains(&node_id) {
            nodes.push(node_id);
        }
    }

    pub fn leave(&self, node_id: &str) {
        self.nodes.write().retain(|n| n != node_id);
    }
}

impl ClusterMembership for StaticMembership {
    fn cluster_name(&self) -> String {
        self.cluster_name.clone()
    }

    fn live_nodes(&self) -> Vec<String> {
        self.nodes.read().clone()
    }
}
