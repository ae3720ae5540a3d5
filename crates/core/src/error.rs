/// Shared error type used across the wabridge crates.
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    /// Destination failed phone-number normalization.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Start requested while a session is already active.
    #[error("already running: {0}")]
    AlreadyRunning(String),

    /// Stop requested with no active transport handle.
    #[error("not running")]
    NotRunning,

    /// Operation requires a live transport handle that does not exist yet.
    #[error("not initialized: {0}")]
    NotInitialized(String),

    /// Send attempted while the session is not connected.
    #[error("not connected: {0}")]
    NotConnected(String),

    /// The transport accepted the message but delivery failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Credential storage read/write/delete failure.
    #[error("storage: {0}")]
    Storage(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
