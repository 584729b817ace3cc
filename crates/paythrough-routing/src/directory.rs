//! Channel directory: the node's live view of its peers' channels,
//! flattened into [`ChannelRecord`]s.

use async_trait::async_trait;
use paythrough_core::{ChannelRecord, PeerEntry};

use crate::error::RoutingError;

/// Read-only access to the node's peer and channel state.
#[async_trait]
pub trait ChannelSource: Send + Sync {
    /// List connected peers together with their channels.
    async fn list_peers(&self) -> Result<Vec<PeerEntry>, RoutingError>;
}

/// Query `source` once and flatten every peer's channels into records.
///
/// Records come back in source order. A failed query fails the whole
/// resolution. Channels that have no short channel id or direction yet are
/// skipped, since they can neither be targeted nor excluded.
pub async fn resolve(source: &dyn ChannelSource) -> Result<Vec<ChannelRecord>, RoutingError> {
    let peers = source.list_peers().await?;
    let records = flatten(peers);
    tracing::debug!(channels = records.len(), "resolved channel directory");
    Ok(records)
}

fn flatten(peers: Vec<PeerEntry>) -> Vec<ChannelRecord> {
    let mut records = Vec::new();
    for peer in peers {
        for channel in peer.channels {
            match (channel.short_channel_id, channel.direction) {
                (Some(short_channel_id), Some(direction)) => records.push(ChannelRecord {
                    short_channel_id,
                    direction,
                    state: channel.state,
                    peer_id: peer.id.clone(),
                }),
                _ => {
                    tracing::trace!(peer = %peer.id, state = %channel.state, "skipping channel without scid");
                }
            }
        }
    }
    records
}
