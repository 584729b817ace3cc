use paythrough_core::RpcError;

/// Payment-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum PayError {
    /// The engine ran the call and reported a failure.
    #[error("payment engine error: {0}")]
    Engine(RpcError),

    /// The engine could not be reached or its reply was unreadable.
    #[error("rpc transport error: {0}")]
    Transport(String),

    #[error("rpc io error: {0}")]
    Io(#[from] std::io::Error),
}
