//! Liveline server library logic.
//!
//! Wires the event registry, the update log, and the fan-out hub behind
//! an axum HTTP surface: JSON CRUD for events, an append endpoint for
//! updates, an SSE stream of full feed snapshots per event, a viewer
//! count, and an image upload endpoint backing `image` updates.

pub mod api;
pub mod api_events;
pub mod api_stream;
pub mod api_updates;
pub mod api_upload;
pub mod config;

use api::{with_conn, ApiError};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use liveline_db::DbPool;
use liveline_feed::FeedHub;
use liveline_log::{push_update, NewUpdate, Update};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Maximum request body size. Covers the largest allowed upload with
/// room for multipart framing; JSON bodies are far smaller.
const MAX_REQUEST_BODY_BYTES: usize = 12 * 1024 * 1024;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Fan-out hub delivering feed snapshots to subscribers.
    pub hub: Arc<FeedHub>,
    /// Directory for uploaded files (images).
    pub upload_dir: String,
    /// Maximum accepted upload size in bytes.
    pub upload_max_bytes: usize,
}

/// Appends an update to an event's log and fans the refreshed snapshot
/// out to every subscriber.
///
/// This is the only write path into a feed: the append and the snapshot
/// read happen on the blocking pool against the same connection, then
/// the result is published. A failed append publishes nothing — readers
/// never see an update the store did not accept.
pub async fn append_and_publish(
    state: &Arc<AppState>,
    event_id: &str,
    new: NewUpdate,
) -> Result<Update, ApiError> {
    let (update, snapshot) = {
        let event_id = event_id.to_string();
        with_conn(&state.pool, move |conn| {
            let update = push_update(conn, &event_id, &new)?;
            let snapshot = liveline_log::snapshot(conn, &event_id)?;
            Ok((update, snapshot))
        })
        .await?
    };

    state.hub.publish(event_id, snapshot).await;

    Ok(update)
}

/// Health check handler.
///
/// Returns `200 OK` with server status and version. Used by load
/// balancers, monitoring, and CI to verify the server is running.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let upload_dir = state.upload_dir.clone();

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/events",
            post(api_events::create_event_handler).get(api_events::list_events_handler),
        )
        .route(
            "/api/events/{eventId}",
            get(api_events::get_event_handler).delete(api_events::delete_event_handler),
        )
        .route(
            "/api/events/slug/{slug}",
            get(api_events::get_event_by_slug_handler),
        )
        .route(
            "/api/events/{eventId}/status",
            patch(api_events::set_status_handler),
        )
        .route(
            "/api/events/{eventId}/updates",
            post(api_updates::push_update_handler).get(api_updates::list_updates_handler),
        )
        .route(
            "/api/events/{eventId}/stream",
            get(api_stream::stream_handler),
        )
        .route(
            "/api/events/{eventId}/viewers",
            get(api_stream::viewers_handler),
        )
        .route("/api/upload", post(api_upload::upload_handler))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
