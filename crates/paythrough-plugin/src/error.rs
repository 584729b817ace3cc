/// Plugin protocol and lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message from host: {0}")]
    Json(#[from] serde_json::Error),

    #[error("host closed the connection mid-message")]
    TruncatedInput,

    #[error("plugin is already initialized")]
    AlreadyInitialized,

    #[error("plugin not initialized")]
    NotInitialized,

    #[error("invalid init parameters: {0}")]
    InvalidInit(String),

    #[error("output channel closed")]
    OutputClosed,
}
