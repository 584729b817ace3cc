//! JSON-RPC 2.0 framing between the host node and the plugin.
//!
//! The host writes requests and notifications to our stdin and reads
//! responses and notifications from our stdout. Messages are bare JSON
//! objects; we terminate ours with a blank line.

use paythrough_core::{DocumentScanner, RpcError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::PluginError;

pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const NOT_INITIALIZED: i64 = -32002;

const READ_CHUNK: usize = 4096;

/// A request (has an `id`) or notification (has none) from the host.
#[derive(Debug, Clone, Deserialize)]
pub struct Incoming {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    jsonrpc: &'static str,
    pub method: &'static str,
    pub params: Value,
}

impl Notification {
    /// A line for the host's own log.
    pub fn log(level: &str, message: &str) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "log",
            params: json!({ "level": level, "message": message }),
        }
    }
}

/// A message queued for the host.
#[derive(Debug, Clone)]
pub enum Outgoing {
    Response(Response),
    Notification(Notification),
}

impl Outgoing {
    fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut bytes = match self {
            Outgoing::Response(r) => serde_json::to_vec(r)?,
            Outgoing::Notification(n) => serde_json::to_vec(n)?,
        };
        bytes.extend_from_slice(b"\n\n");
        Ok(bytes)
    }
}

/// Pulls consecutive JSON documents off a byte stream.
pub struct JsonReader<R> {
    inner: R,
    buf: Vec<u8>,
    scanner: DocumentScanner,
}

impl<R: AsyncRead + Unpin> JsonReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(READ_CHUNK),
            scanner: DocumentScanner::new(),
        }
    }

    /// Next complete document, or `None` once the stream ends cleanly.
    pub async fn next_value(&mut self) -> Result<Option<Value>, PluginError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(doc) = self.take_document()? {
                return Ok(Some(doc));
            }
            let n = self.inner.read(&mut chunk).await?;
            if n == 0 {
                if self.buf.iter().all(u8::is_ascii_whitespace) {
                    return Ok(None);
                }
                return Err(PluginError::TruncatedInput);
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }

    fn take_document(&mut self) -> Result<Option<Value>, PluginError> {
        let Some(end) = self.scanner.scan(&self.buf) else {
            return Ok(None);
        };
        let (doc, consumed) = {
            let mut documents =
                serde_json::Deserializer::from_slice(&self.buf[..end]).into_iter::<Value>();
            match documents.next() {
                Some(Ok(doc)) => (Some(doc), documents.byte_offset()),
                Some(Err(e)) if e.is_eof() => return Ok(None),
                Some(Err(e)) => return Err(e.into()),
                None => (None, end),
            }
        };
        self.buf.drain(..consumed);
        self.scanner.reset();
        Ok(doc)
    }
}

/// Write `message` to `out` as one frame.
pub async fn write_message<W>(out: &mut W, message: &Outgoing) -> Result<(), PluginError>
where
    W: AsyncWrite + Unpin,
{
    let bytes = message.to_bytes()?;
    out.write_all(&bytes).await?;
    out.flush().await?;
    Ok(())
}
