//! Update log API handlers.

use crate::api::{with_conn, ApiError};
use crate::AppState;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use liveline_log::{list_updates, NewUpdate, Update, UpdateFilter};
use liveline_registry::get_event;
use serde::Deserialize;
use std::sync::Arc;

/// Maximum length for update content.
const MAX_CONTENT_LEN: usize = 4096;

/// Query parameters for reading an event's log.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUpdatesParams {
    pub after_seq: Option<i64>,
    pub limit: Option<i64>,
}

/// POST /api/events/{eventId}/updates
///
/// Appends one update and fans the refreshed snapshot out to every
/// subscriber. Delivery from author to log is at-most-once: on failure
/// the error is returned and nothing is queued — the editor resubmits.
pub async fn push_update_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(event_id): Path<String>,
    Json(payload): Json<NewUpdate>,
) -> Result<(StatusCode, Json<Update>), ApiError> {
    if payload.content.len() > MAX_CONTENT_LEN {
        return Err(ApiError::BadRequest("content too long".to_string()));
    }

    let update = crate::append_and_publish(&state, &event_id, payload).await?;

    Ok((StatusCode::CREATED, Json(update)))
}

/// GET /api/events/{eventId}/updates?afterSeq=&limit=
pub async fn list_updates_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(event_id): Path<String>,
    Query(params): Query<ListUpdatesParams>,
) -> Result<Json<Vec<Update>>, ApiError> {
    let updates = with_conn(&state.pool, move |conn| {
        // Distinguish an empty log from a missing event.
        get_event(conn, &event_id)?;
        let filter = UpdateFilter {
            after_seq: params.after_seq,
            limit: params.limit,
        };
        list_updates(conn, &event_id, &filter).map_err(ApiError::from)
    })
    .await?;

    Ok(Json(updates))
}
