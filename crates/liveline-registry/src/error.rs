//! Error types for the event registry.

use liveline_types::EventStatus;

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A database operation failed.
    #[error("registry database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The requested event does not exist.
    #[error("event not found: {0}")]
    NotFound(String),

    /// The requested status change is not in the transition table.
    #[error("illegal status transition: {from} -> {to}")]
    InvalidTransition {
        /// The status the event currently has.
        from: EventStatus,
        /// The status the caller asked for.
        to: EventStatus,
    },

    /// Input rejected before any write was attempted.
    #[error("invalid event data: {0}")]
    Validation(String),
}
