//! Append-only update log for the Liveline platform.
//!
//! Each live event owns an ordered sequence of updates. All writes go
//! through [`push_update`], which assigns the ordering key — a per-event
//! monotonically increasing `seq` plus a server receipt timestamp — inside
//! a single INSERT statement. Client-supplied timestamps are never
//! trusted, so every reader converges to the same order regardless of
//! local clock skew.
//!
//! Updates are immutable once accepted: no edit or delete operation
//! exists in this crate's API. Deletion happens only through the FK
//! cascade when an event is removed administratively.
//!
//! Delivery from author to log is at-most-once: a failed push surfaces
//! its error immediately and is never retried or queued. The caller (a
//! human editor in the console) decides whether to resubmit.

mod error;
mod store;
mod update;

pub use error::LogError;
pub use store::{list_updates, push_update, snapshot, UpdateFilter};
pub use update::{NewUpdate, Update};
