//! Persistence operations for the event registry.
//!
//! All reads resolve `RegistryError::NotFound` via `OptionalExtension`
//! rather than letting `QueryReturnedNoRows` escape. The status write in
//! [`set_status`] is a single atomic UPDATE guarded by the observed
//! current status, so concurrent transitions cannot interleave.

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::RegistryError;
use crate::event::{CreateEventParams, Event};
use liveline_types::EventStatus;

const EVENT_COLUMNS: &str = "id, event_id, slug, title, summary, status, cover_image, author_id, started_at, ended_at";

/// Derives a URL slug from a title: lowercased, alphanumeric runs joined
/// by single dashes, no leading or trailing dash.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Creates a new event with `status = upcoming`.
///
/// The title must be non-empty after trimming. When no slug is supplied
/// (or the supplied slug is empty) one is derived from the title; a title
/// with no alphanumeric characters falls back to the event's UUID. The
/// creation timestamp is stamped by SQLite inside the INSERT.
///
/// Duplicate slugs are accepted: slug uniqueness is an editorial concern,
/// not a constraint, and [`get_event_by_slug`] resolves duplicates to the
/// oldest event.
///
/// # Errors
///
/// Returns `RegistryError::Validation` for an empty title and
/// `RegistryError::Database` on SQL failure.
pub fn create_event(conn: &Connection, params: &CreateEventParams) -> Result<Event, RegistryError> {
    let title = params.title.trim();
    if title.is_empty() {
        return Err(RegistryError::Validation("title must not be empty".into()));
    }

    let event_id = Uuid::new_v4().to_string();

    let slug = match params.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => {
            let derived = slugify(title);
            if derived.is_empty() {
                event_id.clone()
            } else {
                derived
            }
        }
    };

    let (id, started_at): (i64, String) = conn.query_row(
        "INSERT INTO live_events (event_id, slug, title, summary, status, cover_image, author_id)
         VALUES (?1, ?2, ?3, ?4, 'upcoming', ?5, ?6)
         RETURNING id, started_at",
        params![
            event_id,
            slug,
            title,
            params.summary,
            params.cover_image,
            params.author_id,
        ],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    tracing::info!(event_id = %event_id, slug = %slug, "created live event");

    Ok(Event {
        id,
        event_id,
        slug,
        title: title.to_string(),
        summary: params.summary.clone(),
        status: EventStatus::Upcoming,
        cover_image: params.cover_image.clone(),
        author_id: params.author_id.clone(),
        started_at,
        ended_at: None,
    })
}

/// Retrieves an event by its public ID.
pub fn get_event(conn: &Connection, event_id: &str) -> Result<Event, RegistryError> {
    conn.query_row(
        &format!("SELECT {EVENT_COLUMNS} FROM live_events WHERE event_id = ?1"),
        [event_id],
        map_row_to_event,
    )
    .optional()?
    .ok_or_else(|| RegistryError::NotFound(event_id.to_string()))
}

/// Retrieves an event by its slug.
///
/// Slugs are not unique; when several events share one, the oldest
/// (lowest rowid) wins, matching what a public route should render.
pub fn get_event_by_slug(conn: &Connection, slug: &str) -> Result<Event, RegistryError> {
    conn.query_row(
        &format!("SELECT {EVENT_COLUMNS} FROM live_events WHERE slug = ?1 ORDER BY id ASC LIMIT 1"),
        [slug],
        map_row_to_event,
    )
    .optional()?
    .ok_or_else(|| RegistryError::NotFound(slug.to_string()))
}

/// Lists all events, newest first.
pub fn list_events(conn: &Connection) -> Result<Vec<Event>, RegistryError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM live_events ORDER BY started_at DESC, id DESC"
    ))?;

    let rows = stmt.query_map([], map_row_to_event)?;
    let mut events = Vec::new();
    for row in rows {
        events.push(row?);
    }
    Ok(events)
}

/// Transitions an event to a new status.
///
/// The transition is validated against the lifecycle table first, then
/// applied with a single UPDATE conditioned on the status that was
/// observed (`WHERE event_id = ? AND status = ?`). If another writer won
/// the race the UPDATE affects no rows and the observed state is
/// re-checked, so the caller always gets an accurate error. The
/// transition to `ended` stamps `ended_at` in the same statement.
///
/// # Errors
///
/// `RegistryError::NotFound` when the event does not exist and
/// `RegistryError::InvalidTransition` for any move outside the table,
/// including self-transitions and re-opening an ended event.
pub fn set_status(
    conn: &Connection,
    event_id: &str,
    to: EventStatus,
) -> Result<Event, RegistryError> {
    loop {
        let current = get_event(conn, event_id)?;

        if !current.status.can_transition_to(to) {
            return Err(RegistryError::InvalidTransition {
                from: current.status,
                to,
            });
        }

        let changed = conn.execute(
            "UPDATE live_events
             SET status = ?1,
                 ended_at = CASE WHEN ?1 = 'ended' THEN datetime('now') ELSE ended_at END
             WHERE event_id = ?2 AND status = ?3",
            params![to.as_str(), event_id, current.status.as_str()],
        )?;

        if changed == 0 {
            // Lost a race with a concurrent transition; re-read and
            // re-validate against the new state.
            continue;
        }

        tracing::info!(
            event_id = %event_id,
            from = current.status.as_str(),
            to = to.as_str(),
            "event status transition"
        );

        return get_event(conn, event_id);
    }
}

/// Deletes an event and, via FK cascade, its update log.
///
/// Administrative surface only: the public editorial flow never deletes.
pub fn delete_event(conn: &Connection, event_id: &str) -> Result<(), RegistryError> {
    let count = conn.execute("DELETE FROM live_events WHERE event_id = ?1", [event_id])?;
    if count == 0 {
        return Err(RegistryError::NotFound(event_id.to_string()));
    }
    tracing::info!(event_id = %event_id, "deleted live event");
    Ok(())
}

fn map_row_to_event(row: &Row) -> rusqlite::Result<Event> {
    let status_str: String = row.get(5)?;
    let status: EventStatus = status_str.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Event {
        id: row.get(0)?,
        event_id: row.get(1)?,
        slug: row.get(2)?,
        title: row.get(3)?,
        summary: row.get(4)?,
        status,
        cover_image: row.get(6)?,
        author_id: row.get(7)?,
        started_at: row.get(8)?,
        ended_at: row.get(9)?,
    })
}
