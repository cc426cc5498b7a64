use analyzers_inventory_sdk::{AnalyzersInventoryError, IntrospectionError};

use crate::infra::wire::WireError;

/// Domain-level errors for the analyzers inventory
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid plugin registration: {0}")]
    InvalidPlugin(String),

    #[error("Failed to collect analysis components: {0}")]
    CollectionFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] WireError),
}

impl From<IntrospectionError> for DomainError {
    fn from(e: IntrospectionError) -> Self {
        Self::CollectionFailed(e.to_string())
    }
}

impl From<DomainError> for AnalyzersInventoryError {
    fn from(e: DomainError) -> Self {
        Self::Internal(e.to_string())
    }
}
