use async_trait::async_trait;
use paythrough_core::{DocumentScanner, ListPeersResponse, PayCall, PaymentResult, PeerEntry, RpcError};
use paythrough_routing::{ChannelSource, RoutingError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use crate::error::PayError;
use crate::traits::IPaymentEngine;

const READ_CHUNK: usize = 4096;

#[derive(Debug, Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// JSON-RPC client for the node's `lightning-rpc` Unix socket.
///
/// Opens one connection per call. Serves as both the channel directory
/// (`listpeers`) and the payment engine (`pay`).
pub struct LightningRpc {
    socket_path: PathBuf,
    next_id: AtomicU64,
}

impl LightningRpc {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Call `method` and decode its `result`.
    ///
    /// An `error` member in the reply becomes [`PayError::Engine`] with the
    /// node's error object intact.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, PayError>
    where
        P: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = Request {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let bytes = serde_json::to_vec(&request)
            .map_err(|e| PayError::Transport(format!("cannot encode {method} request: {e}")))?;

        tracing::trace!(method, id, socket = %self.socket_path.display(), "rpc call");
        let mut stream = UnixStream::connect(&self.socket_path).await?;
        stream.write_all(&bytes).await?;
        stream.flush().await?;

        let response: Response = read_json(&mut stream).await?;
        match (response.result, response.error) {
            (_, Some(error)) => Err(PayError::Engine(error)),
            (Some(result), None) => serde_json::from_value(result)
                .map_err(|e| PayError::Transport(format!("unexpected {method} result: {e}"))),
            (None, None) => Err(PayError::Transport(format!(
                "{method} reply has neither result nor error"
            ))),
        }
    }
}

/// Read from `stream` until one complete JSON document has arrived.
pub(crate) async fn read_json<T, S>(stream: &mut S) -> Result<T, PayError>
where
    T: DeserializeOwned,
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    let mut scanner = DocumentScanner::new();
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(PayError::Transport(
                "connection closed before a complete reply".into(),
            ));
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = scanner.scan(&buf) else {
            continue;
        };
        let mut documents = serde_json::Deserializer::from_slice(&buf[..end]).into_iter::<T>();
        match documents.next() {
            Some(Ok(doc)) => return Ok(doc),
            Some(Err(e)) if e.is_eof() => continue,
            Some(Err(e)) => return Err(PayError::Transport(format!("malformed reply: {e}"))),
            None => continue,
        }
    }
}

#[async_trait]
impl ChannelSource for LightningRpc {
    async fn list_peers(&self) -> Result<Vec<PeerEntry>, RoutingError> {
        let reply: ListPeersResponse = self
            .call("listpeers", json!({}))
            .await
            .map_err(|e| RoutingError::DirectoryUnavailable(e.to_string()))?;
        Ok(reply.peers)
    }
}

#[async_trait]
impl IPaymentEngine for LightningRpc {
    async fn pay(&self, call: PayCall) -> Result<PaymentResult, PayError> {
        self.call("pay", call).await
    }

    fn engine_id(&self) -> &str {
        "lightning-rpc"
    }
}
