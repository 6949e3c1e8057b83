//! Error types for the update log.

/// Errors that can occur during update log operations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// A database operation failed.
    #[error("update log database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The parent event does not exist.
    #[error("event not found: {0}")]
    NotFound(String),

    /// The parent event has ended; its log is frozen.
    #[error("event has ended, log is frozen: {0}")]
    EventEnded(String),

    /// The parent event has not gone live yet.
    #[error("event is not live yet: {0}")]
    NotLive(String),

    /// Input rejected before any write was attempted.
    #[error("invalid update data: {0}")]
    Validation(String),
}
