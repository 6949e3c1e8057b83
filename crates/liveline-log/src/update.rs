//! Update record and append parameter types.

use liveline_types::UpdateKind;
use serde::{Deserialize, Serialize};

/// One timestamped entry in an event's feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    /// Internal database ID.
    pub id: i64,
    /// Unique public ID for the update (UUID).
    pub update_id: String,
    /// Public ID of the owning event.
    pub event_id: String,
    /// Text content.
    pub content: String,
    /// Entry kind.
    pub kind: UpdateKind,
    /// ID of the posting editor.
    pub author_id: String,
    /// Display name of the posting editor at post time.
    pub author_name: String,
    /// Image URL, present when `kind` is `image`.
    pub image_url: Option<String>,
    /// Per-event sequence number assigned at append; the ordering key.
    pub seq: i64,
    /// Server receipt timestamp (ISO 8601).
    pub created_at: String,
}

/// Parameters for appending a new update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUpdate {
    pub content: String,
    pub kind: UpdateKind,
    pub author_id: String,
    pub author_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}
