use async_trait::async_trait;
use paythrough_core::{PayCall, PaymentResult, PeerEntry, RpcError};
use paythrough_routing::{ChannelSource, RoutingError};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError, RwLock};

use crate::error::PayError;
use crate::traits::IPaymentEngine;

/// In-memory stand-in for a node.
///
/// Serves a scripted peer list as its channel directory and answers `pay`
/// calls from a queue of scripted outcomes, recording every call it
/// receives. Once the queue is empty, payments succeed with
/// `{"status": "complete"}`. Useful for testing the request path without a
/// running node.
pub struct InMemoryNode {
    peers: RwLock<Vec<PeerEntry>>,
    directory_error: RwLock<Option<String>>,
    outcomes: Mutex<VecDeque<Result<Value, RpcError>>>,
    calls: Mutex<Vec<PayCall>>,
}

impl InMemoryNode {
    /// Create a node with no peers and no scripted outcomes.
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(Vec::new()),
            directory_error: RwLock::new(None),
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a node whose directory lists `peers`.
    pub fn with_peers(peers: Vec<PeerEntry>) -> Self {
        let node = Self::new();
        node.set_peers(peers);
        node
    }

    /// Replace the peer list served by `list_peers`.
    pub fn set_peers(&self, peers: Vec<PeerEntry>) {
        *self.peers.write().unwrap_or_else(PoisonError::into_inner) = peers;
    }

    /// Make every directory query fail with `reason` (or succeed again with `None`).
    pub fn set_directory_error(&self, reason: Option<String>) {
        *self
            .directory_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = reason;
    }

    /// Queue the outcome of the next `pay` call.
    pub fn push_pay_outcome(&self, outcome: Result<Value, RpcError>) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Every `pay` call received so far, oldest first.
    pub fn pay_calls(&self) -> Vec<PayCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for InMemoryNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelSource for InMemoryNode {
    async fn list_peers(&self) -> Result<Vec<PeerEntry>, RoutingError> {
        if let Some(reason) = self
            .directory_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(RoutingError::DirectoryUnavailable(reason));
        }
        Ok(self
            .peers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

#[async_trait]
impl IPaymentEngine for InMemoryNode {
    async fn pay(&self, call: PayCall) -> Result<PaymentResult, PayError> {
        tracing::debug!(bolt11 = %call.bolt11, excluded = call.exclude.len(), "in-memory pay");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        let outcome = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match outcome {
            Some(Ok(payload)) => Ok(PaymentResult(payload)),
            Some(Err(e)) => Err(PayError::Engine(e)),
            None => Ok(PaymentResult(json!({"status": "complete"}))),
        }
    }

    fn engine_id(&self) -> &str {
        "in-memory"
    }
}
