//! Database layer for the Liveline platform.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! embedded SQL migrations, and the tables backing the event registry and
//! the update log.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: a single newsroom instance owns its data —
//!   no external database process required. WAL mode allows concurrent
//!   readers with a single writer, which matches the access pattern of a
//!   live blog: many readers, a handful of writing editors.
//! - **`r2d2` connection pool**: bounded connection reuse without manual
//!   lifetime management.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, ensuring migrations ship with the server and cannot
//!   drift from the code that depends on them.
//! - **Server-assigned ordering**: every timestamp in the schema is
//!   stamped with `datetime('now')` inside the INSERT that creates the
//!   row. Client clocks never participate in ordering.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
