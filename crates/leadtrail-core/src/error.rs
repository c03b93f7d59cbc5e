//! Error types for event delivery

use thiserror::Error;

/// Result type for sink operations
pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Errors raised while handing an event to an analytics sink
///
/// None of these ever reach a page: the dispatcher logs them and moves on.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink's background delivery task is not running
    #[error("Sink is not running: {0}")]
    NotRunning(String),

    /// The delivery queue is full and the event was dropped
    #[error("Sink queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// Transport-level failure talking to the backend
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("Backend returned status {status}")]
    Status { status: u16 },

    /// Event could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Sink configuration is unusable
    #[error("Invalid sink configuration: {0}")]
    InvalidConfiguration(String),
}
