//! The plugin's request loop: reads host messages, answers the handshake,
//! and serves `paythrough` once initialized.

use paythrough_core::{PayThroughRequest, RpcError};
use paythrough_payment::{LightningRpc, PayThroughService};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

use crate::config::PluginConfig;
use crate::error::PluginError;
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::manifest::{manifest, METHOD_NAME};
use crate::protocol::{
    write_message, Incoming, JsonReader, Notification, Outgoing, Response, INVALID_PARAMS,
    INVALID_REQUEST, METHOD_NOT_FOUND, NOT_INITIALIZED,
};

const OUTBOX_CAPACITY: usize = 64;

pub const READY_MESSAGE: &str = "Plugin paythrough initialized";

/// Builds the service once the host has told us where its RPC socket is.
pub type ServiceFactory =
    Box<dyn Fn(&Path) -> Result<PayThroughService, PluginError> + Send + Sync>;

#[derive(Debug, Deserialize)]
pub struct InitParams {
    #[serde(default)]
    pub options: Value,
    pub configuration: InitConfiguration,
}

#[derive(Debug, Deserialize)]
pub struct InitConfiguration {
    #[serde(rename = "lightning-dir")]
    pub lightning_dir: PathBuf,
    #[serde(rename = "rpc-file")]
    pub rpc_file: String,
}

impl InitConfiguration {
    pub fn rpc_path(&self) -> PathBuf {
        self.lightning_dir.join(&self.rpc_file)
    }
}

enum Flow {
    Continue,
    Shutdown,
}

pub struct Plugin {
    config: PluginConfig,
    lifecycle: Lifecycle<PayThroughService>,
    factory: ServiceFactory,
    in_flight: Arc<AtomicUsize>,
}

/// Counts a spawned `paythrough` request until it is dropped.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter.clone())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Plugin {
    /// A plugin that talks to the node over its RPC socket.
    pub fn new(config: PluginConfig) -> Self {
        Self::with_factory(
            config,
            Box::new(|socket: &Path| {
                Ok(PayThroughService::from_node(Arc::new(LightningRpc::new(
                    socket,
                ))))
            }),
        )
    }

    pub fn with_factory(config: PluginConfig, factory: ServiceFactory) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::new(),
            factory,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Number of `paythrough` requests still waiting on the engine.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Serve the host until it closes `input` or sends `shutdown`.
    pub async fn run<R, W>(self, input: R, mut output: W) -> Result<(), PluginError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outbox, mut rx) = mpsc::channel::<Outgoing>(OUTBOX_CAPACITY);
        let mut writer = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                write_message(&mut output, &message).await?;
            }
            Ok::<(), PluginError>(())
        });

        let mut reader = JsonReader::new(input);
        let result = loop {
            match reader.next_value().await {
                Ok(Some(doc)) => match self.dispatch(doc, &outbox).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Shutdown) => {
                        tracing::info!("shutdown requested by host");
                        break Ok(());
                    }
                    Err(e) => break Err(e),
                },
                Ok(None) => {
                    tracing::info!("host closed the connection");
                    break Ok(());
                }
                Err(e) => break Err(e),
            }
        };

        // In-flight payments hold their own senders; the writer drains
        // until the last of them finishes or the grace period runs out.
        drop(outbox);
        let pending = self.in_flight();
        if pending > 0 {
            tracing::info!(in_flight = pending, "waiting for in-flight payments");
        }
        let grace = self.config.shutdown.drain_timeout();
        match tokio::time::timeout(grace, &mut writer).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => tracing::warn!(error = %e, "output writer failed"),
            Ok(Err(e)) => tracing::warn!(error = %e, "output writer panicked"),
            Err(_) => {
                tracing::warn!(
                    in_flight = self.in_flight(),
                    grace_ms = grace.as_millis() as u64,
                    "abandoning in-flight payments after drain timeout"
                );
                writer.abort();
            }
        }
        result
    }

    async fn dispatch(
        &self,
        doc: Value,
        outbox: &mpsc::Sender<Outgoing>,
    ) -> Result<Flow, PluginError> {
        let raw_id = doc.get("id").cloned();
        let message: Incoming = match serde_json::from_value(doc) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed message");
                if let Some(id) = raw_id {
                    let error = RpcError::new(INVALID_REQUEST, e.to_string());
                    respond(outbox, Response::failure(id, error)).await?;
                }
                return Ok(Flow::Continue);
            }
        };

        let Some(id) = message.id else {
            return Ok(on_notification(&message.method));
        };

        tracing::debug!(method = %message.method, "request from host");
        match message.method.as_str() {
            "getmanifest" => respond(outbox, Response::success(id, manifest())).await?,
            "init" => match self.init(message.params) {
                Ok(()) => {
                    send(outbox, Outgoing::Notification(Notification::log("info", READY_MESSAGE)))
                        .await?;
                    respond(outbox, Response::success(id, json!({}))).await?;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "init rejected");
                    let error = RpcError::new(error_code(&e), e.to_string());
                    respond(outbox, Response::failure(id, error)).await?;
                }
            },
            METHOD_NAME => self.pay_through(id, message.params, outbox).await?,
            other => {
                let error = RpcError::new(METHOD_NOT_FOUND, format!("unknown method: {other}"));
                respond(outbox, Response::failure(id, error)).await?;
            }
        }
        Ok(Flow::Continue)
    }

    fn init(&self, params: Value) -> Result<(), PluginError> {
        if self.lifecycle.state() == LifecycleState::Ready {
            return Err(PluginError::AlreadyInitialized);
        }
        let params: InitParams =
            serde_json::from_value(params).map_err(|e| PluginError::InvalidInit(e.to_string()))?;

        let socket = self.config.rpc_socket(&params.configuration.rpc_path());
        let service = (self.factory)(&socket)?;
        self.lifecycle.attach(service)?;

        tracing::info!(socket = %socket.display(), "{READY_MESSAGE}");
        Ok(())
    }

    async fn pay_through(
        &self,
        id: Value,
        params: Value,
        outbox: &mpsc::Sender<Outgoing>,
    ) -> Result<(), PluginError> {
        let service = match self.lifecycle.get() {
            Ok(service) => service,
            Err(e) => {
                let error = RpcError::new(NOT_INITIALIZED, e.to_string());
                return respond(outbox, Response::failure(id, error)).await;
            }
        };
        let request = match PayThroughRequest::from_params(params) {
            Ok(request) => request,
            Err(e) => {
                let error = RpcError::new(INVALID_PARAMS, e.to_string());
                return respond(outbox, Response::failure(id, error)).await;
            }
        };

        let outbox = outbox.clone();
        let guard = InFlight::enter(&self.in_flight);
        tokio::spawn(async move {
            let _guard = guard;
            let scid = request.scid.clone();
            let response = match service.pay_through(request).await {
                Ok(result) => {
                    tracing::info!(%scid, "paythrough completed");
                    Response::success(id, result.into_inner())
                }
                Err(e) => {
                    tracing::info!(%scid, error = %e, "paythrough failed");
                    Response::failure(id, e.into_rpc_error())
                }
            };
            if respond(&outbox, response).await.is_err() {
                tracing::warn!(%scid, "response dropped, output closed");
            }
        });
        Ok(())
    }
}

fn on_notification(method: &str) -> Flow {
    match method {
        "shutdown" => Flow::Shutdown,
        other => {
            tracing::debug!(method = other, "ignoring notification");
            Flow::Continue
        }
    }
}

fn error_code(e: &PluginError) -> i64 {
    match e {
        PluginError::InvalidInit(_) => INVALID_PARAMS,
        PluginError::NotInitialized => NOT_INITIALIZED,
        PluginError::AlreadyInitialized => INVALID_REQUEST,
        _ => paythrough_core::INTERNAL_ERROR,
    }
}

async fn respond(outbox: &mpsc::Sender<Outgoing>, response: Response) -> Result<(), PluginError> {
    send(outbox, Outgoing::Response(response)).await
}

async fn send(outbox: &mpsc::Sender<Outgoing>, message: Outgoing) -> Result<(), PluginError> {
    outbox
        .send(message)
        .await
        .map_err(|_| PluginError::OutputClosed)
}
