//! Embedded SQL migration runner.
//!
//! Migrations are SQL files embedded at compile time. They run sequentially
//! on startup, tracked by the `_liveline_migrations` table. Each migration
//! runs exactly once — if it has already been applied, it is skipped.

use rusqlite::Connection;
use thiserror::Error;

/// A single embedded migration.
struct Migration {
    name: &'static str,
    sql: &'static str,
}

/// All migrations in order. New migrations are appended here.
const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "000_init",
        sql: include_str!("migrations/000_init.sql"),
    },
    Migration {
        name: "001_live_events",
        sql: include_str!("migrations/001_live_events.sql"),
    },
    Migration {
        name: "002_event_updates",
        sql: include_str!("migrations/002_event_updates.sql"),
    },
];

/// Errors that can occur during migration execution.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A SQL statement within a migration failed.
    #[error("migration '{name}' failed: {source}")]
    ExecutionFailed {
        /// The name of the migration that failed.
        name: String,
        /// The underlying SQLite error.
        source: rusqlite::Error,
    },

    /// Failed to query migration state.
    #[error("failed to check migration state: {0}")]
    StateQuery(rusqlite::Error),
}

/// Runs all pending migrations against the given connection.
///
/// Migrations that have already been applied (tracked in
/// `_liveline_migrations`) are skipped. New migrations are applied in
/// order and recorded. Returns the number of migrations applied.
///
/// # Errors
///
/// Returns `MigrationError` if any migration fails to execute or if the
/// migration tracking table cannot be queried.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    run_migrations_from_list(conn, MIGRATIONS)
}

fn run_migrations_from_list(
    conn: &Connection,
    migrations: &[Migration],
) -> Result<usize, MigrationError> {
    // Ensure the tracking table exists (the first migration creates it,
    // but we need it to exist before we can check what's been applied).
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _liveline_migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| MigrationError::ExecutionFailed {
        name: "_liveline_migrations_bootstrap".to_string(),
        source: e,
    })?;

    let mut applied = 0;

    for migration in migrations {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _liveline_migrations WHERE name = ?1",
                [migration.name],
                |row| row.get(0),
            )
            .map_err(MigrationError::StateQuery)?;

        if already_applied {
            tracing::debug!(
                migration = migration.name,
                "migration already applied, skipping"
            );
            continue;
        }

        tracing::info!(migration = migration.name, "applying migration");

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| MigrationError::ExecutionFailed {
                name: migration.name.to_string(),
                source: e,
            })?;

        tx.execute_batch(migration.sql)
            .map_err(|e| MigrationError::ExecutionFailed {
                name: migration.name.to_string(),
                source: e,
            })?;

        tx.execute(
            "INSERT INTO _liveline_migrations (name) VALUES (?1)",
            [migration.name],
        )
        .map_err(|e| MigrationError::ExecutionFailed {
            name: migration.name.to_string(),
            source: e,
        })?;

        tx.commit().map_err(|e| MigrationError::ExecutionFailed {
            name: migration.name.to_string(),
            source: e,
        })?;

        applied += 1;
    }

    Ok(applied)
}
