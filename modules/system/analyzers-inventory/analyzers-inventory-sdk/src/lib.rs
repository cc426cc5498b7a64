#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

//! Analyzers Inventory SDK
//!
//! This crate provides the public API for the `analyzers-inventory` module:
//!
//! - [`AnalyzersInventoryClient`] - Public API trait for consumers
//! - [`ComponentRegistry`], [`ClusterMembership`] - Host-owned collaborators
//! - [`AnalysisPlugin`], [`AnalysisPluginSource`] - Extension module contract
//! - [`NodeInfo`], [`AggregatedResponse`], [`NodeFailure`] - Inventory models
//! - [`NodeFilter`] - Target node selection
//! - [`AnalyzersInventoryError`], [`IntrospectionError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use analyzers_inventory_sdk::{AnalyzersInventoryClient, NodeFilter};
//!
//! let filter = NodeFilter::parse(Some("node-a,node-b"))?;
//! let response = client.node_analyzers(&filter).await?;
//!
//! for node in response.nodes() {
//!     println!("{}: {:?}", node.node_id(), node.inventory().analyzers());
//! }
//! ```

pub mod api;
pub mod error;
pub mod filter;
pub mod host_api;
pub mod models;
pub mod plugin_api;

pub use api::AnalyzersInventoryClient;
pub use error::{AnalyzersInventoryError, IntrospectionError};
pub use filter::NodeFilter;
pub use host_api::{ClusterMembership, ComponentRegistry};
pub use models::{
    AggregatedResponse, ComponentInventory, FailureKind, NodeFailure, NodeInfo, PluginComponents,
};
pub use plugin_api::{AnalysisPlugin, AnalysisPluginSource, RegisteredPlugin};

/// Transport action name under which nodes answer inventory requests.
pub const NODE_ANALYZERS_ACTION: &str = "cluster:monitor/node/analyzers";
