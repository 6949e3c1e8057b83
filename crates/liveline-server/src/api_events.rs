//! Event registry API handlers.

use crate::api::{with_conn, ApiError};
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use liveline_registry::{
    create_event, delete_event, get_event, get_event_by_slug, list_events, set_status,
    CreateEventParams, Event,
};
use liveline_types::EventStatus;
use serde::Deserialize;
use std::sync::Arc;

/// Maximum length for an event title.
const MAX_TITLE_LEN: usize = 256;
/// Maximum length for an event summary.
const MAX_SUMMARY_LEN: usize = 2048;

/// Request body for a status transition.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: EventStatus,
}

/// POST /api/events
pub async fn create_event_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<CreateEventParams>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    if payload.title.len() > MAX_TITLE_LEN {
        return Err(ApiError::BadRequest("title too long".to_string()));
    }
    if payload.summary.as_deref().is_some_and(|s| s.len() > MAX_SUMMARY_LEN) {
        return Err(ApiError::BadRequest("summary too long".to_string()));
    }

    let event = with_conn(&state.pool, move |conn| {
        create_event(conn, &payload).map_err(ApiError::from)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/events
pub async fn list_events_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = with_conn(&state.pool, |conn| {
        list_events(conn).map_err(ApiError::from)
    })
    .await?;

    Ok(Json(events))
}

/// GET /api/events/{eventId}
pub async fn get_event_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let event = with_conn(&state.pool, move |conn| {
        get_event(conn, &event_id).map_err(ApiError::from)
    })
    .await?;

    Ok(Json(event))
}

/// GET /api/events/slug/{slug}
///
/// The public reading route: pages address events by slug, not UUID.
pub async fn get_event_by_slug_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let event = with_conn(&state.pool, move |conn| {
        get_event_by_slug(conn, &slug).map_err(ApiError::from)
    })
    .await?;

    Ok(Json(event))
}

/// PATCH /api/events/{eventId}/status
pub async fn set_status_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(event_id): Path<String>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<Json<Event>, ApiError> {
    let event = with_conn(&state.pool, move |conn| {
        set_status(conn, &event_id, payload.status).map_err(ApiError::from)
    })
    .await?;

    Ok(Json(event))
}

/// DELETE /api/events/{eventId}
///
/// Administrative removal. The update log goes with the event (FK
/// cascade) and every active feed subscription is ended.
pub async fn delete_event_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = event_id.clone();
    with_conn(&state.pool, move |conn| {
        delete_event(conn, &id).map_err(ApiError::from)
    })
    .await?;

    state.hub.close(&event_id).await;

    Ok(StatusCode::NO_CONTENT)
}
