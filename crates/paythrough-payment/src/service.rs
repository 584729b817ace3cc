use std::sync::Arc;

use paythrough_core::{PayThroughRequest, PaymentResult, RpcError};
use paythrough_routing::{build_exclusions, resolve, ChannelSource, RoutingError};

use crate::delegator::delegate;
use crate::error::PayError;
use crate::traits::IPaymentEngine;

/// Failure of a `paythrough` request.
#[derive(Debug, thiserror::Error)]
pub enum PayThroughError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Payment(#[from] PayError),
}

impl PayThroughError {
    /// The `{code, message}` object reported to the caller.
    ///
    /// A rejected target channel is `-1`; engine errors pass through as the
    /// engine reported them; anything else is a JSON-RPC internal error.
    pub fn into_rpc_error(self) -> RpcError {
        match self {
            Self::Routing(e @ RoutingError::InvalidChannel { .. }) => {
                RpcError::new(RoutingError::INVALID_CHANNEL_CODE, e.to_string())
            }
            Self::Payment(PayError::Engine(e)) => e,
            other => RpcError::internal(other.to_string()),
        }
    }
}

/// Pays an invoice through a caller-chosen first-hop channel.
///
/// Stateless: every request reads the channel directory afresh, so
/// concurrent requests need no coordination.
pub struct PayThroughService {
    source: Arc<dyn ChannelSource>,
    engine: Arc<dyn IPaymentEngine>,
}

impl PayThroughService {
    pub fn new(source: Arc<dyn ChannelSource>, engine: Arc<dyn IPaymentEngine>) -> Self {
        Self { source, engine }
    }

    /// Use one node connection as both channel directory and payment engine.
    pub fn from_node<N>(node: Arc<N>) -> Self
    where
        N: ChannelSource + IPaymentEngine + 'static,
    {
        Self::new(node.clone(), node)
    }

    pub async fn pay_through(
        &self,
        request: PayThroughRequest,
    ) -> Result<PaymentResult, PayThroughError> {
        let records = resolve(self.source.as_ref()).await?;
        let exclusions = build_exclusions(&request.scid, &records)?;
        let result = delegate(self.engine.as_ref(), request, exclusions).await?;
        Ok(result)
    }
}
