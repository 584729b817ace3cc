//! First-hop exclusion set.
//!
//! The payment engine only accepts a list of forbidden channel halves, so
//! "leave through this channel" is expressed as its complement: every other
//! operational channel is excluded. Hops past the first are left to the
//! engine's own pathfinding.

use paythrough_core::{ChannelRecord, ExclusionId, ShortChannelId};

use crate::error::RoutingError;

/// Compute the exclusions that leave `target` as the only usable first hop.
///
/// `target` must match exactly one operational record. Non-operational
/// channels take no part: they are neither valid targets nor excluded.
pub fn build_exclusions(
    target: &ShortChannelId,
    records: &[ChannelRecord],
) -> Result<Vec<ExclusionId>, RoutingError> {
    let operational: Vec<&ChannelRecord> = records.iter().filter(|r| r.is_operational()).collect();
    let total = operational.len();

    let residual: Vec<&ChannelRecord> = operational
        .into_iter()
        .filter(|r| &r.short_channel_id != target)
        .collect();

    let matched = total - residual.len();
    if matched != 1 {
        tracing::warn!(scid = %target, matched, operational = total, "rejecting target channel");
        return Err(RoutingError::InvalidChannel {
            scid: target.clone(),
        });
    }

    let exclusions: Vec<ExclusionId> = residual.iter().map(|r| r.exclusion_id()).collect();
    tracing::debug!(scid = %target, excluded = exclusions.len(), "built first-hop exclusions");
    Ok(exclusions)
}
