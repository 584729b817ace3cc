//! Paythrough payment layer
//!
//! Provides the payment-engine abstraction, the delegator that hands a
//! constrained payment to it, the end-to-end [`PayThroughService`], and
//! adapters for a live node (Unix-socket JSON-RPC) and an in-memory node.

pub mod adapters;
pub mod delegator;
pub mod error;
pub mod service;
pub mod traits;

pub use adapters::{InMemoryNode, LightningRpc};
pub use delegator::delegate;
pub use error::PayError;
pub use service::{PayThroughError, PayThroughService};
pub use traits::IPaymentEngine;
