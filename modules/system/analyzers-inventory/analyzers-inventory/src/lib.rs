//! Analyzers Inventory Module Implementation
//!
//! Answers "which text-analysis components does each node of the cluster
//! have installed" by fanning a request out to the selected nodes and
//! merging their snapshots. The public API is defined in
//! `analyzers-inventory-sdk` and re-exported here.
//!
//! ## Architecture
//!
//! - **Node side**: [`NodeCollector`] reads the host component registry and
//!   the [`PluginRegistry`]; [`NodeRequestHandler`] answers encoded requests.
//! - **Coordinator side**: [`RequestDispatcher`] scatters the request over a
//!   [`NodeTransport`] and gathers replies under per-node and overall
//!   deadlines. Per-node problems become `NodeFailure` entries.
//! - **Rendering**: [`api::rest::render`] produces the deterministic JSON body.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === PUBLIC API (from SDK) ===
pub use analyzers_inventory_sdk::{
    AggregatedResponse, AnalysisPlugin, AnalysisPluginSource, AnalyzersInventoryClient,
    AnalyzersInventoryError, ClusterMembership, ComponentInventory, ComponentRegistry,
    FailureKind, IntrospectionError, NODE_ANALYZERS_ACTION, NodeFailure, NodeFilter, NodeInfo,
    PluginComponents, RegisteredPlugin,
};

// === CONFIGURATION ===
pub mod config;
pub use config::{AnalyzersInventoryConfig, ConfigError};

// === CLIENT ===
mod local_client;
pub use local_client::AnalyzersInventoryLocalClient;

// === INTERNAL MODULES ===
pub mod api;
pub mod domain;
pub mod infra;

pub use domain::{DomainError, NodeCollector, PluginRegistry, RequestDispatcher};
pub use infra::{LocalTransport, NodeRequestHandler, NodeTransport, StaticMembership, TransportError};
