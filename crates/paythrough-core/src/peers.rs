//! Wire shapes of the node's `listpeers` reply.
//!
//! Only the fields the resolver needs are modelled; everything else the
//! node reports is ignored.

use serde::{Deserialize, Serialize};

use crate::types::{ChannelState, Direction, ShortChannelId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPeersResponse {
    #[serde(default)]
    pub peers: Vec<PeerEntry>,
}

/// A connected peer and the channels this node has with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerEntry {
    pub id: String,
    #[serde(default)]
    pub channels: Vec<PeerChannel>,
}

/// A channel as listed under a peer.
///
/// `short_channel_id` and `direction` are absent until the funding
/// transaction is locked in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerChannel {
    pub state: ChannelState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_channel_id: Option<ShortChannelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl PeerChannel {
    pub fn new(scid: impl Into<ShortChannelId>, direction: Direction, state: ChannelState) -> Self {
        Self {
            state,
            short_channel_id: Some(scid.into()),
            direction: Some(direction),
        }
    }
}
