//! Fixtures shared by the integration tests.

use paythrough_core::{ChannelState, Direction, PeerChannel, PeerEntry};
use serde_json::{json, Value};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;

/// A peer with a single channel.
pub fn peer(id: &str, scid: &str, direction: u8, state: ChannelState) -> PeerEntry {
    PeerEntry {
        id: id.to_string(),
        channels: vec![PeerChannel::new(
            scid,
            Direction::new(direction).expect("direction is 0 or 1"),
            state,
        )],
    }
}

/// A peer with a single `CHANNELD_NORMAL` channel.
pub fn normal_peer(id: &str, scid: &str, direction: u8) -> PeerEntry {
    peer(id, scid, direction, ChannelState::ChanneldNormal)
}

/// Scripted answers of a fake node's RPC socket.
#[derive(Debug, Clone)]
pub struct FakeNode {
    /// `result` of `listpeers`.
    pub listpeers: Value,
    /// Full reply body (`result` or `error` member) for `pay`.
    pub pay_reply: Value,
}

/// Serve `node` on a Unix socket at `path`, one request per connection,
/// until the task is aborted. Every request received is recorded and
/// returned through the channel.
pub fn serve_fake_node(
    path: &Path,
    node: FakeNode,
) -> (JoinHandle<()>, tokio::sync::mpsc::UnboundedReceiver<Value>) {
    let listener = UnixListener::bind(path).expect("bind fake node socket");
    let (seen_tx, seen_rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        loop {
            let Ok((conn, _)) = listener.accept().await else {
                break;
            };
            let node = node.clone();
            let seen_tx = seen_tx.clone();
            tokio::spawn(async move {
                if let Err(e) = answer(conn, &node, &seen_tx).await {
                    tracing::warn!(error = %e, "fake node connection failed");
                }
            });
        }
    });
    (handle, seen_rx)
}

async fn answer(
    mut conn: UnixStream,
    node: &FakeNode,
    seen: &tokio::sync::mpsc::UnboundedSender<Value>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let request: Value = loop {
        let n = conn.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Ok(v) = serde_json::from_slice::<Value>(&buf) {
            break v;
        }
    };

    let mut reply = json!({"jsonrpc": "2.0", "id": request["id"].clone()});
    match request["method"].as_str() {
        Some("listpeers") => reply["result"] = node.listpeers.clone(),
        Some("pay") => {
            for (k, v) in node.pay_reply.as_object().into_iter().flatten() {
                reply[k] = v.clone();
            }
        }
        _ => reply["error"] = json!({"code": -32601, "message": "unknown method"}),
    }
    let _ = seen.send(request);

    let mut body = serde_json::to_vec(&reply)?;
    body.extend_from_slice(b"\n\n");
    conn.write_all(&body).await
}
