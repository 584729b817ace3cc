use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Short channel id as reported by the node, e.g. `103x1x0`.
///
/// Treated as an opaque token: two ids are the same channel iff their
/// strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortChannelId(String);

impl ShortChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShortChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ShortChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Direction bit of a channel half (0 or 1) from this node's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Direction(u8);

impl Direction {
    pub const ZERO: Direction = Direction(0);
    pub const ONE: Direction = Direction(1);

    pub fn new(bit: u8) -> Result<Self, CoreError> {
        match bit {
            0 | 1 => Ok(Self(bit)),
            other => Err(CoreError::InvalidDirection(other)),
        }
    }

    pub fn bit(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Direction {
    type Error = CoreError;

    fn try_from(bit: u8) -> Result<Self, Self::Error> {
        Self::new(bit)
    }
}

impl From<Direction> for u8 {
    fn from(d: Direction) -> Self {
        d.0
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Channel state as reported by the node's `listpeers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelState {
    ChanneldAwaitingLockin,
    /// The only state in which a channel can carry payments.
    ChanneldNormal,
    ChanneldShuttingDown,
    ClosingdSigexchange,
    ClosingdComplete,
    AwaitingUnilateral,
    FundingSpendSeen,
    Onchain,
    DualopendOpenInit,
    DualopendAwaitingLockin,
    /// Any state string this build does not recognise.
    #[serde(other)]
    Unknown,
}

impl ChannelState {
    pub fn is_operational(&self) -> bool {
        matches!(self, ChannelState::ChanneldNormal)
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ChanneldAwaitingLockin => "CHANNELD_AWAITING_LOCKIN",
            Self::ChanneldNormal => "CHANNELD_NORMAL",
            Self::ChanneldShuttingDown => "CHANNELD_SHUTTING_DOWN",
            Self::ClosingdSigexchange => "CLOSINGD_SIGEXCHANGE",
            Self::ClosingdComplete => "CLOSINGD_COMPLETE",
            Self::AwaitingUnilateral => "AWAITING_UNILATERAL",
            Self::FundingSpendSeen => "FUNDING_SPEND_SEEN",
            Self::Onchain => "ONCHAIN",
            Self::DualopendOpenInit => "DUALOPEND_OPEN_INIT",
            Self::DualopendAwaitingLockin => "DUALOPEND_AWAITING_LOCKIN",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// One directed channel edge usable for routing from this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    pub short_channel_id: ShortChannelId,
    pub direction: Direction,
    pub state: ChannelState,
    /// Node id of the peer on the other end.
    pub peer_id: String,
}

impl ChannelRecord {
    pub fn is_operational(&self) -> bool {
        self.state.is_operational()
    }

    pub fn exclusion_id(&self) -> ExclusionId {
        ExclusionId::new(self.short_channel_id.clone(), self.direction)
    }
}

/// A channel half the payment engine must not route through,
/// rendered as `<short_channel_id>/<direction>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExclusionId {
    pub short_channel_id: ShortChannelId,
    pub direction: Direction,
}

impl ExclusionId {
    pub fn new(short_channel_id: ShortChannelId, direction: Direction) -> Self {
        Self {
            short_channel_id,
            direction,
        }
    }
}

impl fmt::Display for ExclusionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.short_channel_id, self.direction)
    }
}

impl FromStr for ExclusionId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scid, dir) = s
            .rsplit_once('/')
            .ok_or_else(|| CoreError::InvalidExclusionId(s.to_string()))?;
        if scid.is_empty() {
            return Err(CoreError::InvalidExclusionId(s.to_string()));
        }
        let bit: u8 = dir
            .parse()
            .map_err(|_| CoreError::InvalidExclusionId(s.to_string()))?;
        Ok(Self::new(ShortChannelId::from(scid), Direction::new(bit)?))
    }
}

impl Serialize for ExclusionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExclusionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
