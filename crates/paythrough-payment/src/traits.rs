use async_trait::async_trait;
use paythrough_core::{PayCall, PaymentResult};

use crate::error::PayError;

/// Payment engine interface.
///
/// The engine owns pathfinding, fees and retries; callers only hand it an
/// invoice, optional tuning parameters and a list of forbidden channel
/// halves.
#[async_trait]
pub trait IPaymentEngine: Send + Sync {
    /// Run a single `pay` call to completion.
    ///
    /// Success and failure payloads are the engine's own and must be
    /// returned unmodified.
    async fn pay(&self, call: PayCall) -> Result<PaymentResult, PayError>;

    /// Return the unique identifier of this engine (e.g. "lightning-rpc").
    fn engine_id(&self) -> &str;
}
