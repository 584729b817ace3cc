//! Integration test: resolve → exclude → delegate through the service,
//! against an in-memory node.

use std::collections::HashSet;
use std::sync::Arc;

use paythrough_core::{ChannelState, PayParams, PayThroughRequest, RpcError};
use paythrough_integration_tests::{normal_peer, peer};
use paythrough_payment::{InMemoryNode, PayThroughError, PayThroughService};
use paythrough_routing::RoutingError;
use serde_json::json;

fn excluded(node: &InMemoryNode, call: usize) -> Vec<String> {
    node.pay_calls()[call]
        .exclude
        .iter()
        .map(|e| e.to_string())
        .collect()
}

// =========================================================================
// Exclusion scenarios
// =========================================================================

#[tokio::test]
async fn test_three_operational_channels_target_middle() {
    let node = Arc::new(InMemoryNode::with_peers(vec![
        normal_peer("alice", "A", 0),
        normal_peer("bob", "B", 1),
        normal_peer("carol", "C", 1),
    ]));
    let service = PayThroughService::from_node(node.clone());

    service
        .pay_through(PayThroughRequest::new("lnbcrt10u1...", "B"))
        .await
        .expect("payment through B should be delegated");

    assert_eq!(excluded(&node, 0), vec!["A/0", "C/1"]);
}

#[tokio::test]
async fn test_opening_channel_is_not_a_valid_target() {
    let node = Arc::new(InMemoryNode::with_peers(vec![
        normal_peer("alice", "A", 0),
        peer("bob", "B", 1, ChannelState::ChanneldAwaitingLockin),
    ]));
    let service = PayThroughService::from_node(node.clone());

    let err = service
        .pay_through(PayThroughRequest::new("lnbcrt10u1...", "B"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PayThroughError::Routing(RoutingError::InvalidChannel { .. })
    ));
    let rpc = err.into_rpc_error();
    assert_eq!(rpc.code, -1);
    assert!(rpc.message.contains('B'));
    assert!(node.pay_calls().is_empty());
}

#[tokio::test]
async fn test_duplicate_operational_entries_rejected() {
    let node = Arc::new(InMemoryNode::with_peers(vec![
        normal_peer("alice", "A", 0),
        normal_peer("bob", "A", 1),
        normal_peer("carol", "C", 0),
    ]));
    let service = PayThroughService::from_node(node.clone());

    let err = service
        .pay_through(PayThroughRequest::new("lnbc", "A"))
        .await
        .unwrap_err();
    assert_eq!(err.into_rpc_error().code, -1);
    assert!(node.pay_calls().is_empty());
}

#[tokio::test]
async fn test_closing_channels_are_neither_target_nor_excluded() {
    let node = Arc::new(InMemoryNode::with_peers(vec![
        normal_peer("alice", "A", 0),
        peer("bob", "B", 1, ChannelState::ChanneldShuttingDown),
        peer("carol", "C", 0, ChannelState::Onchain),
        normal_peer("dave", "D", 1),
    ]));
    let service = PayThroughService::from_node(node.clone());

    service
        .pay_through(PayThroughRequest::new("lnbc", "D"))
        .await
        .unwrap();
    assert_eq!(excluded(&node, 0), vec!["A/0"]);
}

#[tokio::test]
async fn test_directory_order_does_not_change_exclusion_set() {
    let peers = vec![
        normal_peer("p1", "1x1x0", 0),
        normal_peer("p2", "2x1x0", 1),
        normal_peer("p3", "3x1x0", 0),
        normal_peer("p4", "4x1x0", 1),
    ];
    let mut reversed = peers.clone();
    reversed.reverse();

    let node = Arc::new(InMemoryNode::with_peers(peers));
    let service = PayThroughService::from_node(node.clone());
    service
        .pay_through(PayThroughRequest::new("lnbc", "2x1x0"))
        .await
        .unwrap();

    node.set_peers(reversed);
    service
        .pay_through(PayThroughRequest::new("lnbc", "2x1x0"))
        .await
        .unwrap();

    let first: HashSet<String> = excluded(&node, 0).into_iter().collect();
    let second: HashSet<String> = excluded(&node, 1).into_iter().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    assert!(!first.iter().any(|e| e.starts_with("2x1x0/")));
}

#[tokio::test]
async fn test_directory_is_read_per_request() {
    let node = Arc::new(InMemoryNode::with_peers(vec![normal_peer("alice", "A", 0)]));
    let service = PayThroughService::from_node(node.clone());

    let err = service
        .pay_through(PayThroughRequest::new("lnbc", "B"))
        .await
        .unwrap_err();
    assert_eq!(err.into_rpc_error().code, -1);

    node.set_peers(vec![normal_peer("alice", "A", 0), normal_peer("bob", "B", 1)]);
    service
        .pay_through(PayThroughRequest::new("lnbc", "B"))
        .await
        .expect("newly operational channel should be accepted");
    assert_eq!(excluded(&node, 0), vec!["A/0"]);
}

// =========================================================================
// Pass-through and relay
// =========================================================================

#[tokio::test]
async fn test_pass_through_fields_forwarded_unmodified() {
    let node = Arc::new(InMemoryNode::with_peers(vec![
        normal_peer("alice", "A", 0),
        normal_peer("bob", "B", 1),
    ]));
    let service = PayThroughService::from_node(node.clone());

    let params = PayParams {
        amount: Some(50_000_000),
        label: Some("rebalance-bob".into()),
        risk_factor: Some(12.5),
        max_fee_percent: Some(0.25),
        retry_duration: Some(90),
        max_delay: Some(2016),
        exempt_fee: Some(5000),
    };
    service
        .pay_through(PayThroughRequest::new("lnbc", "B").with_params(params.clone()))
        .await
        .unwrap();

    let call = &node.pay_calls()[0];
    assert_eq!(call.params, params);
    assert_eq!(
        serde_json::to_value(call).unwrap(),
        json!({
            "bolt11": "lnbc",
            "msatoshi": 50_000_000,
            "label": "rebalance-bob",
            "riskfactor": 12.5,
            "maxfeepercent": 0.25,
            "retry_for": 90,
            "maxdelay": 2016,
            "exemptfee": 5000,
            "exclude": ["A/0"]
        })
    );
}

#[tokio::test]
async fn test_absent_fields_are_omitted() {
    let node = Arc::new(InMemoryNode::with_peers(vec![normal_peer("alice", "A", 0)]));
    let service = PayThroughService::from_node(node.clone());

    service
        .pay_through(PayThroughRequest::new("lnbc", "A"))
        .await
        .unwrap();

    let wire = serde_json::to_value(&node.pay_calls()[0]).unwrap();
    assert_eq!(wire, json!({"bolt11": "lnbc", "exclude": []}));
}

#[tokio::test]
async fn test_engine_failure_object_returned_unchanged() {
    let node = Arc::new(InMemoryNode::with_peers(vec![
        normal_peer("alice", "A", 0),
        normal_peer("bob", "B", 1),
    ]));
    let raw = json!({"status": "failed", "code": 200, "message": "no route"});
    let engine_error: RpcError = serde_json::from_value(raw.clone()).unwrap();
    node.push_pay_outcome(Err(engine_error));
    let service = PayThroughService::from_node(node.clone());

    let err = service
        .pay_through(PayThroughRequest::new("lnbc", "B"))
        .await
        .unwrap_err();
    assert_eq!(serde_json::to_value(err.into_rpc_error()).unwrap(), raw);
}

#[tokio::test]
async fn test_engine_success_object_returned_unchanged() {
    let node = Arc::new(InMemoryNode::with_peers(vec![normal_peer("alice", "A", 0)]));
    let payload = json!({
        "status": "complete",
        "destination": "035d2b1192dfba134e10e540875d366ebc8bc353d5aa766b80c090b39c3a5d885d",
        "amount_msat": "50000000msat",
        "amount_sent_msat": "50000500msat",
        "parts": 1
    });
    node.push_pay_outcome(Ok(payload.clone()));
    let service = PayThroughService::from_node(node.clone());

    let result = service
        .pay_through(PayThroughRequest::new("lnbc", "A"))
        .await
        .unwrap();
    assert_eq!(result.into_inner(), payload);
}

#[tokio::test]
async fn test_concurrent_requests_same_channel_are_independent() {
    let node = Arc::new(InMemoryNode::with_peers(vec![
        normal_peer("alice", "A", 0),
        normal_peer("bob", "B", 1),
    ]));
    let service = Arc::new(PayThroughService::from_node(node.clone()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .pay_through(PayThroughRequest::new(format!("lnbc-{i}"), "B"))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("each request should be delegated");
    }

    let calls = node.pay_calls();
    assert_eq!(calls.len(), 8);
    assert!(calls.iter().all(|c| c.exclude.len() == 1));
}
