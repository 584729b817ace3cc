use paythrough_core::ShortChannelId;

/// Errors that can occur while resolving channels or building exclusions.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// The target does not match exactly one operational channel.
    #[error("Short channel id {scid} is not a valid operational channel")]
    InvalidChannel { scid: ShortChannelId },

    #[error("channel directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

impl RoutingError {
    /// Code reported to the caller for a rejected target channel.
    pub const INVALID_CHANNEL_CODE: i64 = -1;
}
