//! Shared types and constants for the Liveline platform.
//!
//! This crate provides the foundational types used across all Liveline
//! crates: the event lifecycle status with its transition table, and the
//! update kind enumeration. No crate in the workspace depends on anything
//! *except* `liveline-types` for cross-cutting type definitions, which
//! keeps the dependency graph clean and prevents circular dependencies.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a live coverage event.
///
/// Statuses form a one-directional lifecycle. The only legal transitions
/// are `upcoming → live`, `upcoming → ended`, and `live → ended`; every
/// other write (including re-opening an ended event) is rejected before
/// it reaches the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Created but coverage has not started.
    Upcoming,
    /// Coverage is running; updates may be appended.
    Live,
    /// Coverage has ended; the update log is frozen.
    Ended,
}

impl EventStatus {
    /// Returns the canonical string label stored in the database and used
    /// on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Live => "live",
            Self::Ended => "ended",
        }
    }

    /// Whether a transition from `self` to `to` is allowed.
    ///
    /// Self-transitions are not allowed: setting an event to the status it
    /// already has is treated as an illegal transition, not a no-op.
    pub fn can_transition_to(self, to: EventStatus) -> bool {
        matches!(
            (self, to),
            (Self::Upcoming, Self::Live) | (Self::Upcoming, Self::Ended) | (Self::Live, Self::Ended)
        )
    }

    /// Whether this status is terminal (no further transitions exist).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(Self::Upcoming),
            "live" => Ok(Self::Live),
            "ended" => Ok(Self::Ended),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown event status string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown event status: {0}")]
pub struct ParseStatusError(pub String);

/// Kind of a single update in an event's feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    /// Plain text entry.
    Text,
    /// Entry carrying an image URL.
    Image,
    /// Breaking-news entry, highlighted by readers.
    Breaking,
}

impl UpdateKind {
    /// Returns the canonical string label for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Breaking => "breaking",
        }
    }
}

impl std::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UpdateKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "breaking" => Ok(Self::Breaking),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown update kind string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown update kind: {0}")]
pub struct ParseKindError(pub String);
