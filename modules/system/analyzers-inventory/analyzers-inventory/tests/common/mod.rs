#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for analyzers-inventory integration tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use analyzers_inventory::infra::wire;
use analyzers_inventory::{
    AnalysisPlugin, AnalysisPluginSource, AnalyzersInventoryConfig, ComponentRegistry, IntrospectionError,
    LocalTransport, NodeCollector, NodeRequestHandler, NodeTransport, PluginRegistry,
    RegisteredPlugin, RequestDispatcher, StaticMembership, TransportError,
};
use async_trait::async_trait;
use bytes::Bytes;

pub const CLUSTER: &str = "test-cluster";

/// Component registry returning fixed name lists.
#[derive(Clone, Default)]
pub struct StaticRegistry {
    pub analyzers: Vec<String>,
    pub tokenizers: Vec<String>,
    pub token_filters: Vec<String>,
    pub char_filters: Vec<String>,
    pub normalizers: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_owned()).collect()
}

impl StaticRegistry {
    pub fn builtin() -> Self {
        Self {
            analyzers: owned(&["standard", "simple", "whitespace", "keyword"]),
            tokenizers: owned(&["standard", "whitespace", "keyword"]),
            token_filters: owned(&["lowercase", "stop", "asciifolding"]),
            char_filters: owned(&["html_strip", "mapping"]),
            normalizers: owned(&["lowercase"]),
        }
    }
}

impl ComponentRegistry for StaticRegistry {
    fn analyzer_names(&self) -> Result<Vec<String>, IntrospectionError> {
        Ok(self.analyzers.clone())
    }
    fn tokenizer_names(&self) -> Result<Vec<String>, IntrospectionError> {
        Ok(self.tokenizers.clone())
    }
    fn token_filter_names(&self) -> Result<Vec<String>, IntrospectionError> {
        Ok(self.token_filters.clone())
    }
    fn char_filter_names(&self) -> Result<Vec<String>, IntrospectionError> {
        Ok(self.char_filters.clone())
    }
    fn normalizer_names(&self) -> Result<Vec<String>, IntrospectionError> {
        Ok(self.normalizers.clone())
    }
}

/// Registry whose introspection is unavailable.
pub struct FailingRegistry;

impl ComponentRegistry for FailingRegistry {
    fn analyzer_names(&self) -> Result<Vec<String>, IntrospectionError> {
        Err(IntrospectionError::new("analysis registry", "registry closed"))
    }
    fn tokenizer_names(&self) -> Result<Vec<String>, IntrospectionError> {
        Ok(Vec::new())
    }
    fn token_filter_names(&self) -> Result<Vec<String>, IntrospectionError> {
        Ok(Vec::new())
    }
    fn char_filter_names(&self) -> Result<Vec<String>, IntrospectionError> {
        Ok(Vec::new())
    }
    fn normalizer_names(&self) -> Result<Vec<String>, IntrospectionError> {
        Ok(Vec::new())
    }
}

/// Plugin enumeration that is unavailable.
pub struct FailingPluginSource;

impl AnalysisPluginSource for FailingPluginSource {
    fn analysis_plugins(&self) -> Result<Vec<RegisteredPlugin>, IntrospectionError> {
        Err(IntrospectionError::new("plugin service", "plugins not loaded"))
    }
}

/// First test plugin: one tokenizer and one token filter.
pub struct Test01Plugin;

impl AnalysisPlugin for Test01Plugin {
    fn tokenizers(&self) -> Vec<String> {
        vec!["xx_test_01_tokenizer".to_owned()]
    }
    fn token_filters(&self) -> Vec<String> {
        vec!["xx_test_01_tokenFilter".to_owned()]
    }
}

/// Second test plugin with distinct component names.
pub struct Test02Plugin;

impl AnalysisPlugin for Test02Plugin {
    fn tokenizers(&self) -> Vec<String> {
        vec!["xx_test_02_tokenizer".to_owned()]
    }
    fn token_filters(&self) -> Vec<String> {
        vec!["xx_test_02_tokenFilter".to_owned()]
    }
}

/// Plugin that contributes nothing.
pub struct EmptyPlugin;

impl AnalysisPlugin for EmptyPlugin {}

pub fn plugin_registry(plugins: Vec<(&str, Arc<dyn AnalysisPlugin>)>) -> Arc<PluginRegistry> {
    let registry = Arc::new(PluginRegistry::new());
    for (id, plugin) in plugins {
        registry.register(id, plugin).unwrap();
    }
    registry
}

pub fn handler(
    node_id: &str,
    registry: Arc<dyn ComponentRegistry>,
    plugins: Arc<dyn AnalysisPluginSource>,
) -> Arc<NodeRequestHandler> {
    Arc::new(NodeRequestHandler::new(Arc::new(NodeCollector::new(
        node_id, registry, plugins,
    ))))
}

/// How a scripted node misbehaves.
#[derive(Clone)]
pub enum Fault {
    /// Answers after the given delay.
    Delay(Duration),
    /// Connection refused.
    Unreachable,
    /// Replies with bytes that are not a valid reply envelope.
    Garbage,
}

/// Transport routing to in-process handlers, with optional per-node faults.
#[derive(Default)]
pub struct ScriptedTransport {
    local: LocalTransport,
    faults: HashMap<String, Fault>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(self, handler: Arc<NodeRequestHandler>) -> Self {
        self.local.register(handler);
        self
    }

    pub fn with_fault(mut self, node_id: &str, fault: Fault) -> Self {
        self.faults.insert(node_id.to_owned(), fault);
        self
    }
}

#[async_trait]
impl NodeTransport for ScriptedTransport {
    async fn send(&self, node_id: &str, request: Bytes) -> Result<Bytes, TransportError> {
        match self.faults.get(node_id) {
            Some(Fault::Unreachable) => Err(TransportError::Remote {
                node_id: node_id.to_owned(),
                reason: "connection refused".to_owned(),
            }),
            Some(Fault::Garbage) => Ok(Bytes::from_static(&[wire::WIRE_VERSION, 0x07, 0xff])),
            Some(Fault::Delay(delay)) => {
                tokio::time::sleep(*delay).await;
                self.local.send(node_id, request).await
            }
            None => self.local.send(node_id, request).await,
        }
    }
}

pub fn config(node_timeout: Duration, request_timeout: Duration) -> AnalyzersInventoryConfig {
    AnalyzersInventoryConfig {
        node_timeout,
        request_timeout,
        ..AnalyzersInventoryConfig::default()
    }
}

pub fn dispatcher(
    nodes: &[&str],
    transport: ScriptedTransport,
    config: AnalyzersInventoryConfig,
) -> RequestDispatcher {
    RequestDispatcher::new(
        Arc::new(StaticMembership::new(CLUSTER, nodes.iter().copied())),
        Arc::new(transport),
        config,
    )
    .unwrap()
}
