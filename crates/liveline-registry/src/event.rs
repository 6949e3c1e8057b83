//! Event record and creation parameter types.

use liveline_types::EventStatus;
use serde::{Deserialize, Serialize};

/// A live coverage event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Internal database ID.
    pub id: i64,
    /// Unique public ID for the event (UUID).
    pub event_id: String,
    /// URL key derived from the title. Not guaranteed unique.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Optional one-paragraph summary shown on landing pages.
    pub summary: Option<String>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Optional cover image URL.
    pub cover_image: Option<String>,
    /// ID of the editor who created the event.
    pub author_id: String,
    /// Server timestamp at creation (ISO 8601).
    pub started_at: String,
    /// Server timestamp of the transition to `ended`, if any (ISO 8601).
    pub ended_at: Option<String>,
}

/// Parameters for creating a new event.
///
/// `slug` is optional; when absent or empty it is derived from the title
/// with [`crate::slugify`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventParams {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub author_id: String,
}
