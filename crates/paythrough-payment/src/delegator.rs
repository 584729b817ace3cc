use paythrough_core::{ExclusionId, PayCall, PayThroughRequest, PaymentResult};

use crate::error::PayError;
use crate::traits::IPaymentEngine;

/// Hand `request` to `engine` with `exclusions` attached and relay its
/// outcome untouched.
pub async fn delegate(
    engine: &dyn IPaymentEngine,
    request: PayThroughRequest,
    exclusions: Vec<ExclusionId>,
) -> Result<PaymentResult, PayError> {
    let call = PayCall {
        bolt11: request.bolt11,
        params: request.params,
        exclude: exclusions,
    };

    tracing::info!(
        engine = engine.engine_id(),
        scid = %request.scid,
        excluded = call.exclude.len(),
        "delegating payment"
    );

    let outcome = engine.pay(call).await;
    if let Err(e) = &outcome {
        tracing::info!(engine = engine.engine_id(), error = %e, "payment engine returned an error");
    }
    outcome
}
