//! Unit tests for the fan-out hub.

use std::time::Duration;

use liveline_log::Update;
use liveline_types::UpdateKind;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::{FeedHub, Snapshot};

const EVENT: &str = "ev-1";

fn make_update(seq: i64, content: &str) -> Update {
    Update {
        id: seq,
        update_id: format!("up-{seq}"),
        event_id: EVENT.to_string(),
        content: content.to_string(),
        kind: UpdateKind::Text,
        author_id: "editor-1".to_string(),
        author_name: "Ed".to_string(),
        image_url: None,
        seq,
        created_at: "2026-08-07 12:00:00".to_string(),
    }
}

/// A newest-first snapshot of `n` updates, like the store produces.
fn snapshot_of(n: i64) -> Vec<Update> {
    (1..=n).rev().map(|i| make_update(i, &format!("update {i}"))).collect()
}

async fn next_or_panic(sub: &mut crate::FeedSubscription) -> Snapshot {
    timeout(Duration::from_secs(1), sub.next())
        .await
        .expect("should not time out")
        .expect("channel should be open")
}

// ── subscribe / publish tests ────────────────────────────────────────

#[tokio::test]
async fn subscribe_before_any_publish_starts_empty() {
    let hub = FeedHub::new();
    let sub = hub.subscribe(EVENT).await;
    assert!(sub.initial.is_empty());
}

#[tokio::test]
async fn seeded_subscribe_delivers_seed_immediately() {
    let hub = FeedHub::new();
    let sub = hub.subscribe_seeded(EVENT, snapshot_of(3)).await;
    assert_eq!(sub.initial.len(), 3);
    assert_eq!(sub.initial[0].content, "update 3");
}

#[tokio::test]
async fn existing_channel_cache_wins_over_seed() {
    let hub = FeedHub::new();
    hub.publish(EVENT, snapshot_of(5)).await;

    // A stale seed read before the publish must not rewind the cache.
    let sub = hub.subscribe_seeded(EVENT, snapshot_of(2)).await;
    assert_eq!(sub.initial.len(), 5);
}

#[tokio::test]
async fn publish_reaches_all_subscribers_in_the_same_order() {
    let hub = FeedHub::new();
    let mut sub_a = hub.subscribe(EVENT).await;
    let mut sub_b = hub.subscribe(EVENT).await;

    hub.publish(EVENT, snapshot_of(1)).await;
    hub.publish(EVENT, snapshot_of(2)).await;
    hub.publish(EVENT, snapshot_of(3)).await;

    for sub in [&mut sub_a, &mut sub_b] {
        let mut seen = Vec::new();
        for _ in 0..3 {
            let snap = next_or_panic(sub).await;
            seen.push(snap.iter().map(|u| u.seq).collect::<Vec<_>>());
        }
        assert_eq!(seen, vec![vec![1], vec![2, 1], vec![3, 2, 1]]);
    }
}

#[tokio::test]
async fn late_subscriber_gets_the_full_current_snapshot() {
    let hub = FeedHub::new();
    hub.publish(EVENT, snapshot_of(4)).await;

    let sub = hub.subscribe(EVENT).await;
    assert_eq!(sub.initial.len(), 4, "no missed entries");
    let seqs: Vec<i64> = sub.initial.iter().map(|u| u.seq).collect();
    assert_eq!(seqs, vec![4, 3, 2, 1], "no duplicated entries");
}

#[tokio::test]
async fn lagged_subscriber_converges_on_the_latest_snapshot() {
    let hub = FeedHub::with_capacity(1);
    let mut sub = hub.subscribe(EVENT).await;

    for n in 1..=5 {
        hub.publish(EVENT, snapshot_of(n)).await;
    }

    // The intermediate snapshots are gone; the next delivery is complete
    // anyway.
    let snap = next_or_panic(&mut sub).await;
    assert_eq!(snap.len(), 5);
}

#[tokio::test]
async fn subscriber_count_is_honest() {
    let hub = FeedHub::new();
    assert_eq!(hub.subscriber_count(EVENT).await, 0);

    let sub_a = hub.subscribe(EVENT).await;
    let sub_b = hub.subscribe(EVENT).await;
    assert_eq!(hub.subscriber_count(EVENT).await, 2);

    drop(sub_a);
    drop(sub_b);
    assert_eq!(hub.subscriber_count(EVENT).await, 0);
}

#[tokio::test]
async fn close_ends_active_subscriptions() {
    let hub = FeedHub::new();
    let mut sub = hub.subscribe(EVENT).await;

    assert!(hub.close(EVENT).await);
    let ended = timeout(Duration::from_secs(1), sub.next())
        .await
        .expect("should not time out");
    assert!(ended.is_none(), "closed channel ends the stream");

    assert!(!hub.close(EVENT).await, "second close finds nothing");
}

// ── callback subscription tests ──────────────────────────────────────

#[tokio::test]
async fn callback_fires_for_initial_and_each_publish() {
    let hub = FeedHub::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<usize>();

    let _handle = hub
        .subscribe_with(EVENT, snapshot_of(2), move |snap| {
            let _ = tx.send(snap.len());
        })
        .await;

    let initial = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("initial delivery should arrive")
        .expect("sender alive");
    assert_eq!(initial, 2, "initial delivery is the seed snapshot");

    hub.publish(EVENT, snapshot_of(3)).await;
    let second = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("published snapshot should arrive")
        .expect("sender alive");
    assert_eq!(second, 3);
}

#[tokio::test]
async fn unsubscribe_is_idempotent_and_stops_delivery() {
    let hub = FeedHub::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<usize>();

    let handle = hub
        .subscribe_with(EVENT, Vec::new(), move |snap| {
            let _ = tx.send(snap.len());
        })
        .await;

    // Initial (empty) delivery.
    let initial = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("initial delivery should arrive")
        .expect("sender alive");
    assert_eq!(initial, 0);

    handle.unsubscribe();
    handle.unsubscribe();
    handle.unsubscribe();
    assert!(!handle.is_active());

    hub.publish(EVENT, snapshot_of(3)).await;

    // The callback task is gone, so its sender is dropped and the stream
    // ends without delivering the post-unsubscribe snapshot.
    let after = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("should not time out");
    assert!(after.is_none(), "no callbacks after unsubscribe");
}

#[tokio::test]
async fn dropping_the_handle_unsubscribes() {
    let hub = FeedHub::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<usize>();

    let handle = hub
        .subscribe_with(EVENT, Vec::new(), move |snap| {
            let _ = tx.send(snap.len());
        })
        .await;

    let _ = timeout(Duration::from_secs(1), rx.recv()).await;
    drop(handle);

    hub.publish(EVENT, snapshot_of(1)).await;
    let after = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("should not time out");
    assert!(after.is_none());
}
