//! Subscription handles for the feed hub.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::hub::Snapshot;

/// One subscriber's live view of an event's feed.
///
/// `initial` is the snapshot at subscribe time; [`next`](Self::next)
/// yields each later one. The subscription ends (returns `None`) when the
/// event's channel is closed. Dropping the subscription detaches it from
/// the hub.
pub struct FeedSubscription {
    event_id: String,
    /// Snapshot at subscribe time, for immediate delivery.
    pub initial: Snapshot,
    rx: broadcast::Receiver<Snapshot>,
}

impl FeedSubscription {
    pub(crate) fn new(
        event_id: String,
        initial: Snapshot,
        rx: broadcast::Receiver<Snapshot>,
    ) -> Self {
        Self {
            event_id,
            initial,
            rx,
        }
    }

    /// The event this subscription watches.
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Waits for the next published snapshot.
    ///
    /// A lagged receiver is logged and skipped forward: because every
    /// delivery is the full list, the next snapshot is always a complete
    /// view and nothing needs replaying. Returns `None` once the channel
    /// is closed.
    pub async fn next(&mut self) -> Option<Snapshot> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(
                        event_id = %self.event_id,
                        missed,
                        "feed subscriber lagged; intermediate snapshots dropped"
                    );
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Cancellation handle for a callback subscription.
///
/// Returned by [`FeedHub::subscribe_with`](crate::FeedHub::subscribe_with).
/// [`unsubscribe`](Self::unsubscribe) is idempotent: the first call stops
/// delivery, later calls are no-ops, and no callback fires after the
/// first call returns control to the runtime. Dropping the handle
/// unsubscribes too, so the hub never outlives its last caller's
/// interest.
pub struct SubscriptionHandle {
    active: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub(crate) fn spawn<F>(mut subscription: FeedSubscription, callback: F) -> Self
    where
        F: Fn(Snapshot) + Send + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let task_active = Arc::clone(&active);

        let task = tokio::spawn(async move {
            callback(subscription.initial.clone());

            while let Some(snapshot) = subscription.next().await {
                if !task_active.load(Ordering::SeqCst) {
                    break;
                }
                callback(snapshot);
            }
        });

        Self { active, task }
    }

    /// Stops delivery. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.task.abort();
        }
    }

    /// Whether the subscription is still delivering.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) && !self.task.is_finished()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
