/// Core type errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid channel direction: {0} (expected 0 or 1)")]
    InvalidDirection(u8),

    #[error("invalid exclusion id: {0}")]
    InvalidExclusionId(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}
