//! Persistence operations for the update log.
//!
//! All writes go through [`push_update`], which proves the parent event
//! is live, assigns the per-event sequence number, and stamps the server
//! timestamp in a single INSERT statement.
//!
//! Reads go through [`list_updates`] (cursor + limit) and [`snapshot`]
//! (the full ordered list used for feed publication).

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::LogError;
use crate::update::{NewUpdate, Update};
use liveline_types::UpdateKind;

const UPDATE_COLUMNS: &str =
    "id, update_id, event_id, content, kind, author_id, author_name, image_url, seq, created_at";

/// Appends a single update to an event's log.
///
/// The INSERT selects its target row from `live_events` filtered on
/// `status = 'live'`, so one statement atomically (a) proves the parent
/// exists and is accepting updates, (b) assigns
/// `seq = COALESCE(MAX(seq), 0) + 1` scoped to the event, and (c) stamps
/// `created_at` with the server clock. This eliminates the
/// read-modify-write race where two concurrent authors could observe the
/// same MAX(seq) and produce duplicate sequence numbers, and closes the
/// window where an event ends between a status check and the append.
///
/// # Errors
///
/// `LogError::Validation` for empty content or an image update without a
/// URL; `LogError::NotFound` when the event does not exist;
/// `LogError::EventEnded` when its log is frozen; `LogError::NotLive`
/// when coverage has not started; `LogError::Database` on SQL failure.
pub fn push_update(
    conn: &Connection,
    event_id: &str,
    new: &NewUpdate,
) -> Result<Update, LogError> {
    let content = new.content.trim();
    if content.is_empty() {
        return Err(LogError::Validation("content must not be empty".into()));
    }
    if new.kind == UpdateKind::Image && new.image_url.as_deref().map_or(true, str::is_empty) {
        return Err(LogError::Validation(
            "image updates require an imageUrl".into(),
        ));
    }

    let update_id = Uuid::new_v4().to_string();

    let row = conn
        .query_row(
            "INSERT INTO event_updates
                (update_id, event_id, content, kind, author_id, author_name, image_url, seq, created_at)
             SELECT
                ?1, e.event_id, ?2, ?3, ?4, ?5, ?6,
                (SELECT COALESCE(MAX(u.seq), 0) + 1 FROM event_updates u WHERE u.event_id = e.event_id),
                datetime('now')
             FROM live_events e
             WHERE e.event_id = ?7 AND e.status = 'live'
             RETURNING id, seq, created_at",
            params![
                update_id,
                content,
                new.kind.as_str(),
                new.author_id,
                new.author_name,
                new.image_url,
                event_id,
            ],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((id, seq, created_at)) = row else {
        // Nothing inserted: the event is missing or not accepting updates.
        let status: Option<String> = conn
            .query_row(
                "SELECT status FROM live_events WHERE event_id = ?1",
                [event_id],
                |row| row.get(0),
            )
            .optional()?;

        return Err(match status.as_deref() {
            None => LogError::NotFound(event_id.to_string()),
            Some("ended") => LogError::EventEnded(event_id.to_string()),
            Some(_) => LogError::NotLive(event_id.to_string()),
        });
    };

    tracing::debug!(event_id = %event_id, seq, "appended update");

    Ok(Update {
        id,
        update_id,
        event_id: event_id.to_string(),
        content: content.to_string(),
        kind: new.kind,
        author_id: new.author_id.clone(),
        author_name: new.author_name.clone(),
        image_url: new.image_url.clone(),
        seq,
        created_at,
    })
}

/// Filter criteria for reading an event's log.
#[derive(Debug, Clone, Default)]
pub struct UpdateFilter {
    /// Only return updates with `seq` strictly greater than this value.
    pub after_seq: Option<i64>,
    /// Maximum number of updates to return (default: 200).
    pub limit: Option<i64>,
}

/// Reads an event's updates, newest first.
///
/// `filter.after_seq` supports cursor-style reads for clients that track
/// their last-seen sequence number; `filter.limit` bounds the page
/// (default 200). A missing event yields an empty list — existence checks
/// belong to the registry.
pub fn list_updates(
    conn: &Connection,
    event_id: &str,
    filter: &UpdateFilter,
) -> Result<Vec<Update>, LogError> {
    // Collect WHERE clauses and bind parameters separately so nothing is
    // interpolated.
    let mut clauses = vec!["event_id = ?1".to_string()];
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
        vec![Box::new(event_id.to_string())];
    let mut idx = 2u32;

    if let Some(after) = filter.after_seq {
        clauses.push(format!("seq > ?{idx}"));
        param_values.push(Box::new(after));
        idx += 1;
    }

    let limit = filter.limit.unwrap_or(200);
    let where_clause = clauses.join(" AND ");
    let sql = format!(
        "SELECT {UPDATE_COLUMNS}
         FROM event_updates
         WHERE {where_clause}
         ORDER BY seq DESC
         LIMIT ?{idx}"
    );

    param_values.push(Box::new(limit));

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(|p| &**p).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_refs.as_slice(), map_row_to_update)?;

    let mut updates = Vec::new();
    for row in rows {
        updates.push(row?);
    }
    Ok(updates)
}

/// Reads the full ordered list for an event, newest first.
///
/// This is what the fan-out hub publishes on every change and what a
/// fresh subscriber receives as its initial delivery.
pub fn snapshot(conn: &Connection, event_id: &str) -> Result<Vec<Update>, LogError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {UPDATE_COLUMNS} FROM event_updates WHERE event_id = ?1 ORDER BY seq DESC"
    ))?;

    let rows = stmt.query_map([event_id], map_row_to_update)?;
    let mut updates = Vec::new();
    for row in rows {
        updates.push(row?);
    }
    Ok(updates)
}

fn map_row_to_update(row: &Row) -> rusqlite::Result<Update> {
    let kind_str: String = row.get(4)?;
    let kind: UpdateKind = kind_str.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Update {
        id: row.get(0)?,
        update_id: row.get(1)?,
        event_id: row.get(2)?,
        content: row.get(3)?,
        kind,
        author_id: row.get(5)?,
        author_name: row.get(6)?,
        image_url: row.get(7)?,
        seq: row.get(8)?,
        created_at: row.get(9)?,
    })
}
