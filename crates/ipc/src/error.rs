//! Wire errors for worker messages.

/// Errors while encoding or decoding a worker command or event.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("Failed to encode worker message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Malformed worker message: {0}")]
    InvalidFormat(String),
}
