//! The snapshot publish/subscribe hub.

use std::collections::HashMap;
use std::sync::Arc;

use liveline_log::Update;
use tokio::sync::{broadcast, RwLock};

use crate::subscription::{FeedSubscription, SubscriptionHandle};

/// A full ordered view of one event's log, newest first, shared cheaply
/// between all subscribers.
pub type Snapshot = Arc<Vec<Update>>;

/// Default per-event broadcast buffer depth.
///
/// A receiver that falls more than this many snapshots behind is lagged:
/// it loses the intermediate snapshots and resumes at a newer one, which
/// is harmless under full-snapshot delivery.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

struct FeedChannel {
    tx: broadcast::Sender<Snapshot>,
    latest: Snapshot,
}

/// Publish/subscribe hub keyed by event ID.
///
/// One broadcast channel per event, created lazily on first publish or
/// first subscribe. The hub caches the latest published snapshot so a new
/// subscriber receives its initial view immediately, under the same lock
/// that registers its receiver — no snapshot can fall into the gap
/// between the initial delivery and the stream.
///
/// The hub holds only channel senders; it never keeps a subscriber alive.
/// Dropping a [`FeedSubscription`] (or unsubscribing a
/// [`SubscriptionHandle`]) is all the cleanup a subscriber needs.
pub struct FeedHub {
    capacity: usize,
    channels: RwLock<HashMap<String, FeedChannel>>,
}

impl FeedHub {
    /// Creates a hub with [`DEFAULT_CHANNEL_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a hub with an explicit per-event buffer depth.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Publishes a new snapshot for an event.
    ///
    /// The snapshot becomes the cached initial view for future
    /// subscribers and is broadcast to every current one. Publishing with
    /// no active subscribers is not an error — the cache still advances.
    pub async fn publish(&self, event_id: &str, updates: Vec<Update>) {
        let snapshot: Snapshot = Arc::new(updates);
        let mut channels = self.channels.write().await;

        let channel = channels
            .entry(event_id.to_string())
            .or_insert_with(|| self.empty_channel());
        channel.latest = snapshot.clone();

        match channel.tx.send(snapshot) {
            Ok(receivers) => {
                tracing::debug!(event_id, receivers, "published snapshot");
            }
            Err(_) => {
                tracing::debug!(event_id, "published snapshot with no subscribers");
            }
        }
    }

    /// Subscribes to an event's feed.
    ///
    /// The returned subscription carries the current snapshot for
    /// immediate delivery plus a receiver of every later one. An event
    /// nobody has published for yet starts from an empty snapshot.
    pub async fn subscribe(&self, event_id: &str) -> FeedSubscription {
        self.subscribe_seeded(event_id, Vec::new()).await
    }

    /// Subscribes to an event's feed, seeding the channel's cache when it
    /// does not exist yet.
    ///
    /// The seed is the store's current view, read by the caller. It only
    /// applies when this subscriber is the one creating the channel: an
    /// existing channel already has a cache at least as new as any seed
    /// (every accepted append publishes), and an append racing this
    /// subscribe lands on the receiver registered here.
    pub async fn subscribe_seeded(&self, event_id: &str, seed: Vec<Update>) -> FeedSubscription {
        let mut channels = self.channels.write().await;

        let channel = channels.entry(event_id.to_string()).or_insert_with(|| {
            let mut ch = self.empty_channel();
            ch.latest = Arc::new(seed);
            ch
        });

        FeedSubscription::new(event_id.to_string(), channel.latest.clone(), channel.tx.subscribe())
    }

    /// Subscribes with a callback, the push-style variant of
    /// [`subscribe_seeded`].
    ///
    /// The callback fires once with the initial snapshot, then once per
    /// published snapshot, from a spawned task. The returned handle stops
    /// delivery; unsubscribing is idempotent and also happens on drop.
    pub async fn subscribe_with<F>(
        &self,
        event_id: &str,
        seed: Vec<Update>,
        callback: F,
    ) -> SubscriptionHandle
    where
        F: Fn(Snapshot) + Send + 'static,
    {
        let subscription = self.subscribe_seeded(event_id, seed).await;
        SubscriptionHandle::spawn(subscription, callback)
    }

    /// Number of receivers currently attached to an event's channel.
    ///
    /// This is an honest count of live subscriptions — when the stream is
    /// degraded the caller sees it, rather than a synthesized figure.
    pub async fn subscriber_count(&self, event_id: &str) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(event_id)
            .map(|ch| ch.tx.receiver_count())
            .unwrap_or(0)
    }

    /// Removes an event's channel, ending every active subscription.
    ///
    /// Called when an event is deleted administratively. Returns whether
    /// a channel existed.
    pub async fn close(&self, event_id: &str) -> bool {
        let mut channels = self.channels.write().await;
        let existed = channels.remove(event_id).is_some();
        if existed {
            tracing::info!(event_id, "closed feed channel");
        }
        existed
    }

    fn empty_channel(&self) -> FeedChannel {
        let (tx, _rx) = broadcast::channel(self.capacity);
        FeedChannel {
            tx,
            latest: Arc::new(Vec::new()),
        }
    }
}

impl Default for FeedHub {
    fn default() -> Self {
        Self::new()
    }
}
