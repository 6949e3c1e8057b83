//! SSE feed stream and viewer count handlers.

use crate::api::{with_conn, ApiError};
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    response::{
        sse::{Event, KeepAlive},
        Json, Sse,
    },
};
use futures_util::{stream, Stream, StreamExt};
use liveline_feed::Snapshot;
use liveline_registry::get_event;
use std::{convert::Infallible, sync::Arc};

/// Serializes a snapshot into one SSE `snapshot` event.
///
/// A snapshot that fails to serialize is logged and skipped rather than
/// tearing the stream down; the next publish delivers a complete view
/// anyway.
fn snapshot_event(snapshot: &Snapshot) -> Option<Event> {
    match serde_json::to_string(&**snapshot) {
        Ok(data) => Some(Event::default().event("snapshot").data(data)),
        Err(e) => {
            tracing::error!("failed to serialize feed snapshot: {}", e);
            None
        }
    }
}

/// Handler for `GET /api/events/{eventId}/stream`.
///
/// Emits the current full snapshot immediately, then a fresh full
/// snapshot on every change to the event's log, newest first. The stream
/// ends when the event's channel is closed (admin delete); it reports
/// nothing it cannot back with store data.
pub async fn stream_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    // Resolve the event and its current log before attaching, so an
    // unknown event 404s instead of producing an empty stream.
    let seed = {
        let event_id = event_id.clone();
        with_conn(&state.pool, move |conn| {
            get_event(conn, &event_id)?;
            liveline_log::snapshot(conn, &event_id).map_err(ApiError::from)
        })
        .await?
    };

    let subscription = state.hub.subscribe_seeded(&event_id, seed).await;
    let initial = subscription.initial.clone();

    let snapshots = stream::once(async move { initial }).chain(stream::unfold(
        subscription,
        |mut subscription| async move {
            subscription.next().await.map(|snap| (snap, subscription))
        },
    ));

    let sse_stream = snapshots
        .filter_map(|snapshot| async move { snapshot_event(&snapshot).map(Ok::<_, Infallible>) });

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

/// Handler for `GET /api/events/{eventId}/viewers`.
///
/// Reports the real number of attached feed subscribers. A degraded or
/// empty feed reads as zero — the count is never synthesized.
pub async fn viewers_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    {
        let event_id = event_id.clone();
        with_conn(&state.pool, move |conn| {
            get_event(conn, &event_id).map_err(ApiError::from)
        })
        .await?;
    }

    let viewers = state.hub.subscriber_count(&event_id).await;
    Ok(Json(serde_json::json!({ "viewers": viewers })))
}
