pub mod error;
pub mod framing;
pub mod peers;
pub mod request;
pub mod rpc;
pub mod types;

pub use error::CoreError;
pub use framing::DocumentScanner;
pub use peers::{ListPeersResponse, PeerChannel, PeerEntry};
pub use request::{PayCall, PayParams, PayThroughRequest, PaymentResult, PARAM_NAMES};
pub use rpc::{RpcError, INTERNAL_ERROR};
pub use types::{ChannelRecord, ChannelState, Direction, ExclusionId, ShortChannelId};
