#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for scatter/gather dispatch

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use analyzers_inventory::{
    AnalysisPlugin, AnalyzersInventoryClient, AnalyzersInventoryConfig,
    AnalyzersInventoryLocalClient, FailureKind, NodeFilter,
};
use common::{
    EmptyPlugin, FailingPluginSource, FailingRegistry, Fault, ScriptedTransport, StaticRegistry, Test01Plugin,
    Test02Plugin, config, dispatcher, handler, plugin_registry,
};

fn healthy_node(node_id: &str) -> Arc<analyzers_inventory::NodeRequestHandler> {
    handler(
        node_id,
        Arc::new(StaticRegistry::builtin()),
        plugin_registry(vec![
            ("test-01", Arc::new(Test01Plugin) as Arc<dyn AnalysisPlugin>),
            ("test-02", Arc::new(Test02Plugin)),
        ]),
    )
}

fn three_nodes() -> ScriptedTransport {
    ScriptedTransport::new()
        .with_node(healthy_node("node-a"))
        .with_node(healthy_node("node-b"))
        .with_node(healthy_node("node-c"))
}

// =============================================================================
// Aggregation
// =============================================================================

#[tokio::test]
async fn test_all_nodes_answer() {
    let dispatcher = dispatcher(
        &["node-c", "node-a", "node-b"],
        three_nodes(),
        AnalyzersInventoryConfig::default(),
    );

    let response = dispatcher.dispatch(&NodeFilter::All).await.unwrap();

    assert_eq!(response.cluster_name(), common::CLUSTER);
    assert_eq!(response.total(), 3);
    assert_eq!(response.successful(), 3);
    let ids: Vec<_> = response.nodes().iter().map(|n| n.node_id()).collect();
    assert_eq!(ids, ["node-a", "node-b", "node-c"]);

    let node = response.node("node-b").unwrap();
    assert!(node.inventory().analyzers().contains("standard"));
    let test01 = node.plugin("test-01").unwrap();
    assert!(test01.tokenizers().contains("xx_test_01_tokenizer"));
    assert!(test01.token_filters().contains("xx_test_01_tokenFilter"));
    assert!(!test01.tokenizers().contains("xx_test_02_tokenizer"));
}

#[tokio::test]
async fn test_partial_failure_keeps_healthy_nodes() {
    let transport = three_nodes().with_fault("node-b", Fault::Unreachable);
    let dispatcher = dispatcher(
        &["node-a", "node-b", "node-c"],
        transport,
        AnalyzersInventoryConfig::default(),
    );

    let response = dispatcher.dispatch(&NodeFilter::All).await.unwrap();

    assert_eq!(response.successful(), 2);
    assert_eq!(response.failed(), 1);
    assert!(response.node("node-a").is_some());
    assert!(response.node("node-c").is_some());
    let failure = response.failure("node-b").unwrap();
    assert_eq!(failure.kind(), FailureKind::Unreachable);
    assert!(failure.reason().contains("connection refused"));
}

#[tokio::test]
async fn test_every_node_failing_is_still_a_response() {
    let transport = ScriptedTransport::new()
        .with_fault("node-a", Fault::Unreachable)
        .with_fault("node-b", Fault::Garbage);
    let dispatcher = dispatcher(
        &["node-a", "node-b"],
        transport,
        AnalyzersInventoryConfig::default(),
    );

    let response = dispatcher.dispatch(&NodeFilter::All).await.unwrap();

    assert!(response.nodes().is_empty());
    assert_eq!(response.failed(), 2);
    assert_eq!(
        response.failure("node-b").unwrap().kind(),
        FailureKind::Serialization
    );
}

#[tokio::test]
async fn test_node_without_transport_handler_is_unreachable() {
    let dispatcher = dispatcher(
        &["node-a", "node-z"],
        ScriptedTransport::new().with_node(healthy_node("node-a")),
        AnalyzersInventoryConfig::default(),
    );

    let response = dispatcher.dispatch(&NodeFilter::All).await.unwrap();

    assert_eq!(
        response.failure("node-z").unwrap().kind(),
        FailureKind::Unreachable
    );
}

#[tokio::test]
async fn test_registry_failure_is_a_collection_failure() {
    let transport = ScriptedTransport::new()
        .with_node(healthy_node("node-a"))
        .with_node(handler(
            "node-b",
            Arc::new(FailingRegistry),
            plugin_registry(vec![]),
        ));
    let dispatcher = dispatcher(
        &["node-a", "node-b"],
        transport,
        AnalyzersInventoryConfig::default(),
    );

    let response = dispatcher.dispatch(&NodeFilter::All).await.unwrap();

    assert_eq!(response.successful(), 1);
    let failure = response.failure("node-b").unwrap();
    assert_eq!(failure.kind(), FailureKind::CollectionFailure);
    assert!(failure.reason().contains("registry closed"));
}

#[tokio::test]
async fn test_plugin_enumeration_failure_is_a_collection_failure() {
    let transport = ScriptedTransport::new()
        .with_node(healthy_node("node-a"))
        .with_node(handler(
            "node-b",
            Arc::new(StaticRegistry::builtin()),
            Arc::new(FailingPluginSource),
        ));
    let dispatcher = dispatcher(
        &["node-a", "node-b"],
        transport,
        AnalyzersInventoryConfig::default(),
    );

    let response = dispatcher.dispatch(&NodeFilter::All).await.unwrap();

    assert!(response.node("node-a").is_some());
    assert!(response.node("node-b").is_none());
    let failure = response.failure("node-b").unwrap();
    assert_eq!(failure.kind(), FailureKind::CollectionFailure);
    assert!(failure.reason().contains("plugins not loaded"));
}

// =============================================================================
// Filtering
// =============================================================================

#[tokio::test]
async fn test_filter_selects_subset_and_drops_unknown_ids() {
    let dispatcher = dispatcher(
        &["node-a", "node-b", "node-c"],
        three_nodes(),
        AnalyzersInventoryConfig::default(),
    );
    let filter = NodeFilter::parse(Some("node-c,ghost,node-a")).unwrap();

    let response = dispatcher.dispatch(&filter).await.unwrap();

    assert_eq!(response.total(), 2);
    let ids: Vec<_> = response.nodes().iter().map(|n| n.node_id()).collect();
    assert_eq!(ids, ["node-a", "node-c"]);
    assert!(response.failure("ghost").is_none());
}

#[tokio::test]
async fn test_single_node_filter_touches_only_that_node() {
    let transport = three_nodes().with_fault("node-a", Fault::Unreachable);
    let dispatcher = dispatcher(
        &["node-a", "node-b", "node-c"],
        transport,
        AnalyzersInventoryConfig::default(),
    );

    let response = dispatcher
        .dispatch(&NodeFilter::parse(Some("node-b")).unwrap())
        .await
        .unwrap();

    assert_eq!(response.total(), 1);
    assert!(response.node("node-b").is_some());
    assert!(response.failures().is_empty());
}

#[tokio::test]
async fn test_no_matching_nodes_yields_empty_response() {
    let empty_cluster = dispatcher(&[], ScriptedTransport::new(), AnalyzersInventoryConfig::default());
    let response = empty_cluster.dispatch(&NodeFilter::All).await.unwrap();
    assert_eq!(response.total(), 0);

    let single_node = dispatcher(
        &["node-a"],
        three_nodes(),
        AnalyzersInventoryConfig::default(),
    );
    let response = single_node
        .dispatch(&NodeFilter::ids(["ghost"]))
        .await
        .unwrap();
    assert!(response.nodes().is_empty());
    assert!(response.failures().is_empty());
}

// =============================================================================
// Timeouts
// =============================================================================

#[tokio::test]
async fn test_slow_node_becomes_timeout() {
    let transport = three_nodes().with_fault("node-b", Fault::Delay(Duration::from_secs(5)));
    let dispatcher = dispatcher(
        &["node-a", "node-b", "node-c"],
        transport,
        config(Duration::from_millis(100), Duration::from_secs(2)),
    );

    let started = Instant::now();
    let response = dispatcher.dispatch(&NodeFilter::All).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(response.successful(), 2);
    assert_eq!(
        response.failure("node-b").unwrap().kind(),
        FailureKind::Timeout
    );
}

#[tokio::test]
async fn test_request_deadline_bounds_total_latency() {
    let transport = ScriptedTransport::new()
        .with_node(healthy_node("node-a"))
        .with_node(healthy_node("node-b"))
        .with_fault("node-b", Fault::Delay(Duration::from_secs(5)));
    // The per-node budget outlasts the request, so only the overall
    // deadline can end node-b's wait.
    let dispatcher = dispatcher(
        &["node-a", "node-b"],
        transport,
        config(Duration::from_secs(5), Duration::from_millis(200)),
    );

    let started = Instant::now();
    let response = dispatcher.dispatch(&NodeFilter::All).await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_millis(800), "took {elapsed:?}");
    assert!(response.node("node-a").is_some());
    let failure = response.failure("node-b").unwrap();
    assert_eq!(failure.kind(), FailureKind::Timeout);
    assert!(
        failure.reason().contains("request deadline"),
        "unexpected reason: {}",
        failure.reason()
    );
}

// =============================================================================
// Local client
// =============================================================================

#[tokio::test]
async fn test_local_client_delegates_to_dispatcher() {
    let transport = ScriptedTransport::new().with_node(handler(
        "node-a",
        Arc::new(StaticRegistry::default()),
        plugin_registry(vec![("empty", Arc::new(EmptyPlugin) as Arc<dyn AnalysisPlugin>)]),
    ));
    let client = AnalyzersInventoryLocalClient::new(Arc::new(dispatcher(
        &["node-a"],
        transport,
        AnalyzersInventoryConfig::default(),
    )));

    let response = client.node_analyzers(&NodeFilter::All).await.unwrap();

    let node = response.node("node-a").unwrap();
    assert!(node.inventory().analyzers().is_empty());
    let empty = node.plugin("empty").unwrap();
    assert!(empty.analyzers().is_empty());
    assert!(empty.hunspell_dictionaries().is_empty());
}
