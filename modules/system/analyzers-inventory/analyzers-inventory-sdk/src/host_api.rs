//! Read-only views of host-owned services consumed by the module.

use crate::error::IntrospectionError;

/// Read-only introspection of the node-local analysis component registry.
///
/// Implementations must not mutate registry state and must be callable
/// concurrently.
pub trait ComponentRegistry: Send + Sync {
    /// # Errors
    /// Returns [`IntrospectionError`] if the registry is unavailable.
    fn analyzer_names(&self) -> Result<Vec<String>, IntrospectionError>;

    /// # Errors
    /// Returns [`IntrospectionError`] if the registry is unavailable.
    fn tokenizer_names(&self) -> Result<Vec<String>, IntrospectionError>;

    /// # Errors
    /// Returns [`IntrospectionError`] if the registry is unavailable.
    fn token_filter_names(&self) -> Result<Vec<String>, IntrospectionError>;

    /// # Errors
    /// Returns [`IntrospectionError`] if the registry is unavailable.
    fn char_filter_names(&self) -> Result<Vec<String>, IntrospectionError>;

    /// # Errors
    /// Returns [`IntrospectionError`] if the registry is unavailable.
    fn normalizer_names(&self) -> Result<Vec<String>, IntrospectionError>;
}

/// Cluster membership as seen by the coordinating node.
pub trait ClusterMembership: Send + Sync {
    fn cluster_name(&self) -> String;

    /// Identifiers of the nodes currently reachable.
    fn live_nodes(&self) -> Vec<String>;
}
