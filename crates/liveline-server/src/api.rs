//! Shared API error type and database access helper.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use liveline_db::DbPool;
use liveline_log::LogError;
use liveline_registry::RegistryError;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound(id) => ApiError::NotFound(format!("event not found: {id}")),
            RegistryError::InvalidTransition { .. } => ApiError::Conflict(e.to_string()),
            RegistryError::Validation(msg) => ApiError::BadRequest(msg),
            RegistryError::Database(ref err) => {
                tracing::error!(error = %err, "registry operation failed");
                ApiError::InternalServerError(e.to_string())
            }
        }
    }
}

impl From<LogError> for ApiError {
    fn from(e: LogError) -> Self {
        match e {
            LogError::NotFound(id) => ApiError::NotFound(format!("event not found: {id}")),
            LogError::EventEnded(_) | LogError::NotLive(_) => ApiError::Conflict(e.to_string()),
            LogError::Validation(msg) => ApiError::BadRequest(msg),
            LogError::Database(ref err) => {
                tracing::error!(error = %err, "update log operation failed");
                ApiError::InternalServerError(e.to_string())
            }
        }
    }
}

/// Runs a closure against a pooled connection on the blocking thread pool.
///
/// rusqlite is synchronous; every handler routes its database work
/// through here so the async runtime is never blocked.
pub async fn with_conn<T, F>(pool: &DbPool, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> Result<T, ApiError> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let conn = pool
            .get()
            .map_err(|e| ApiError::InternalServerError(format!("db connection failed: {e}")))?;
        f(&conn)
    })
    .await
    .map_err(|e| ApiError::InternalServerError(format!("task join error: {e}")))?
}
