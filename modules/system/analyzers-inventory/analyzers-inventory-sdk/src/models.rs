//! Inventory models shared by the collector, the dispatcher and consumers.
//!
//! All name collections are `BTreeSet`s: unique and iterated in ascending
//! lexicographic order. Models are immutable once constructed; the only way
//! to obtain a different inventory is to build a new one.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

fn name_set<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// Cluster-registered text-analysis components known to one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentInventory {
    analyzers: BTreeSet<String>,
    tokenizers: BTreeSet<String>,
    token_filters: BTreeSet<String>,
    char_filters: BTreeSet<String>,
    normalizers: BTreeSet<String>,
}

impl ComponentInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_analyzers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.analyzers = name_set(names);
        self
    }

    #[must_use]
    pub fn with_tokenizers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokenizers = name_set(names);
        self
    }

    #[must_use]
    pub fn with_token_filters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.token_filters = name_set(names);
        self
    }

    #[must_use]
    pub fn with_char_filters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.char_filters = name_set(names);
        self
    }

    #[must_use]
    pub fn with_normalizers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.normalizers = name_set(names);
        self
    }

    #[must_use]
    pub fn analyzers(&self) -> &BTreeSet<String> {
        &self.analyzers
    }

    #[must_use]
    pub fn tokenizers(&self) -> &BTreeSet<String> {
        &self.tokenizers
    }

    #[must_use]
    pub fn token_filters(&self) -> &BTreeSet<String> {
        &self.token_filters
    }

    #[must_use]
    pub fn char_filters(&self) -> &BTreeSet<String> {
        &self.char_filters
    }

    #[must_use]
    pub fn normalizers(&self) -> &BTreeSet<String> {
        &self.normalizers
    }
}

/// Components contributed by a single extension module.
///
/// Extension modules do not contribute normalizers. Ordering is by plugin
/// name first (the name is unique within a node).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PluginComponents {
    name: String,
    analyzers: BTreeSet<String>,
    tokenizers: BTreeSet<String>,
    token_filters: BTreeSet<String>,
    char_filters: BTreeSet<String>,
    hunspell_dictionaries: BTreeSet<String>,
}

impl PluginComponents {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            analyzers: BTreeSet::new(),
            tokenizers: BTreeSet::new(),
            token_filters: BTreeSet::new(),
            char_filters: BTreeSet::new(),
            hunspell_dictionaries: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_analyzers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.analyzers = name_set(names);
        self
    }

    #[must_use]
    pub fn with_tokenizers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokenizers = name_set(names);
        self
    }

    #[must_use]
    pub fn with_token_filters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.token_filters = name_set(names);
        self
    }

    #[must_use]
    pub fn with_char_filters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.char_filters = name_set(names);
        self
    }

    #[must_use]
    pub fn with_hunspell_dictionaries<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hunspell_dictionaries = name_set(names);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn analyzers(&self) -> &BTreeSet<String> {
        &self.analyzers
    }

    #[must_use]
    pub fn tokenizers(&self) -> &BTreeSet<String> {
        &self.tokenizers
    }

    #[must_use]
    pub fn token_filters(&self) -> &BTreeSet<String> {
        &self.token_filters
    }

    #[must_use]
    pub fn char_filters(&self) -> &BTreeSet<String> {
        &self.char_filters
    }

    #[must_use]
    pub fn hunspell_dictionaries(&self) -> &BTreeSet<String> {
        &self.hunspell_dictionaries
    }
}

/// Immutable snapshot of one node's analysis components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    node_id: String,
    inventory: ComponentInventory,
    plugins: BTreeMap<String, PluginComponents>,
}

impl NodeInfo {
    /// Builds a snapshot. Plugins sharing a name collapse into one entry,
    /// the last one in iteration order wins.
    #[must_use]
    pub fn new<I>(node_id: impl Into<String>, inventory: ComponentInventory, plugins: I) -> Self
    where
        I: IntoIterator<Item = PluginComponents>,
    {
        let mut by_name = BTreeMap::new();
        for plugin in plugins {
            by_name.insert(plugin.name.clone(), plugin);
        }
        Self {
            node_id: node_id.into(),
            inventory,
            plugins: by_name,
        }
    }

    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    #[must_use]
    pub fn inventory(&self) -> &ComponentInventory {
        &self.inventory
    }

    /// Per-plugin breakdown keyed by plugin name.
    #[must_use]
    pub fn plugins(&self) -> &BTreeMap<String, PluginComponents> {
        &self.plugins
    }

    #[must_use]
    pub fn plugin(&self, name: &str) -> Option<&PluginComponents> {
        self.plugins.get(name)
    }
}

/// Why a node has no entry among the successful responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The node could not be reached.
    Unreachable,
    /// The node did not answer within its budget or the overall deadline.
    Timeout,
    /// The node was reached but could not introspect its registries.
    CollectionFailure,
    /// The node answered with a payload that could not be decoded.
    Serialization,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unreachable => "node_unreachable",
            Self::Timeout => "node_timeout",
            Self::CollectionFailure => "collection_failure",
            Self::Serialization => "serialization_error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node that produced no inventory, with the cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    node_id: String,
    kind: FailureKind,
    reason: String,
}

impl NodeFailure {
    #[must_use]
    pub fn new(node_id: impl Into<String>, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            kind,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Merged outcome of one scatter/gather request.
///
/// Successes and failures are both sorted by node id, so identical outcomes
/// compare equal regardless of the order in which nodes answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedResponse {
    cluster_name: String,
    nodes: Vec<NodeInfo>,
    failures: Vec<NodeFailure>,
}

impl AggregatedResponse {
    /// Each node id must appear at most once across `nodes` and `failures`;
    /// `total` counts entries, not distinct ids. The dispatcher and the wire
    /// decoder both uphold this. Use [`Self::duplicate_node_id`] to check
    /// responses assembled elsewhere.
    #[must_use]
    pub fn new(
        cluster_name: impl Into<String>,
        mut nodes: Vec<NodeInfo>,
        mut failures: Vec<NodeFailure>,
    ) -> Self {
        nodes.sort_by(|a, b| a.node_id.cmp(&b.node_id));
        failures.sort_by(|a, b| a.node_id.cmp(&b.node_id));
        Self {
            cluster_name: cluster_name.into(),
            nodes,
            failures,
        }
    }

    #[must_use]
    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    #[must_use]
    pub fn nodes(&self) -> &[NodeInfo] {
        &self.nodes
    }

    #[must_use]
    pub fn failures(&self) -> &[NodeFailure] {
        &self.failures
    }

    /// Number of nodes the request was dispatched to.
    #[must_use]
    pub fn total(&self) -> usize {
        self.nodes.len() + self.failures.len()
    }

    #[must_use]
    pub fn successful(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&NodeInfo> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }

    #[must_use]
    pub fn failure(&self, node_id: &str) -> Option<&NodeFailure> {
        self.failures.iter().find(|f| f.node_id == node_id)
    }

    /// First node id listed more than once across successes and failures.
    #[must_use]
    pub fn duplicate_node_id(&self) -> Option<&str> {
        let mut seen = BTreeSet::new();
        self.nodes
            .iter()
            .map(|n| n.node_id.as_str())
            .chain(self.failures.iter().map(|f| f.node_id.as_str()))
            .find(|id| !seen.insert(*id))
    }
}
