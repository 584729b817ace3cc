//! Core Lightning plugin exposing `paythrough`.
//!
//! Speaks the host's JSON-RPC plugin protocol on stdin/stdout and serves
//! requests through [`paythrough_payment::PayThroughService`].

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod manifest;
pub mod plugin;
pub mod protocol;

pub use config::{PluginConfig, ShutdownConfig};
pub use error::PluginError;
pub use lifecycle::{Lifecycle, LifecycleState};
pub use plugin::{Plugin, ServiceFactory, READY_MESSAGE};
