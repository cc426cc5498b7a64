//! Error types for the analyzers inventory module.

use thiserror::Error;

/// Errors that can occur when using the analyzers inventory API.
///
/// Per-node problems (unreachable nodes, collection failures, malformed
/// replies) are never reported here; they are part of the successful
/// [`AggregatedResponse`](crate::AggregatedResponse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzersInventoryError {
    /// The node filter could not be parsed. Rejected before dispatch.
    #[error("invalid node filter: {0}")]
    InvalidFilter(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A host collaborator could not be introspected.
///
/// Returned by [`ComponentRegistry`](crate::ComponentRegistry) and
/// [`AnalysisPluginSource`](crate::AnalysisPluginSource) implementations when
/// the underlying registry is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_name} unavailable: {message}")]
pub struct IntrospectionError {
    pub source_name: String,
    pub message: String,
}

impl IntrospectionError {
    #[must_use]
    pub fn new(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
