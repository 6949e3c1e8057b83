//! Fan-out notifier for the Liveline platform.
//!
//! Delivers every change to an event's update log to all parties
//! currently watching that event, without manual refresh. Delivery is
//! **full-snapshot**: each notification carries the complete ordered
//! list, newest first, rather than an incremental delta. This trades
//! bandwidth for simplicity at breaking-news volumes (tens to low
//! hundreds of updates per event) and makes lag self-healing — a
//! subscriber that misses intermediate snapshots is fully caught up by
//! the next one.
//!
//! Because every snapshot is computed from the store's own ordering key,
//! all subscribers converge to the same order regardless of local clock
//! skew. That convergence is the one property this whole layer exists to
//! preserve.
//!
//! The hub never fabricates data on failure: a lagged receiver is logged
//! at warn level, and a closed channel ends the subscription visibly.

mod hub;
mod subscription;

pub use hub::{FeedHub, Snapshot, DEFAULT_CHANNEL_CAPACITY};
pub use subscription::{FeedSubscription, SubscriptionHandle};

#[cfg(test)]
mod tests;
