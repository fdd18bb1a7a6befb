//! Unlock notifications from score submission to display

mod common;

use std::sync::Arc;
use std::time::Duration;

use mindgym::config::Config;
use mindgym::notifications::{
    NotificationHandle, NotificationQueue, QueueState, RecordingSink, SinkCall, SoundCue,
    DEFAULT_DWELL,
};
use mindgym::progress::{MemoryBackend, ProgressStore, USER_NAMESPACE};
use mindgym::Engine;
use tokio::time::Instant;

use common::{registry, SMALL_CATALOG};

#[tokio::test(start_paused = true)]
async fn test_multi_tier_unlock_shows_each_tier_for_full_dwell() {
    let sink = Arc::new(RecordingSink::new());
    let (handle, _task) =
        NotificationHandle::spawn(NotificationQueue::new(sink.clone(), DEFAULT_DWELL));
    let store = ProgressStore::load(registry(SMALL_CATALOG), Arc::new(MemoryBackend::new()))
        .with_notifier(handle.clone());

    let start = Instant::now();
    let events = store.submit_score("digits", "3x3-10", 15.0, false).await;
    assert_eq!(events.len(), 3);

    tokio::time::sleep(Duration::from_millis(10)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.state, QueueState::Showing);
    assert_eq!(snapshot.current.as_ref(), Some(&events[0]));
    assert_eq!(snapshot.pending, 2);

    // Halfway through the first dwell nothing has advanced
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(handle.snapshot().current.as_ref(), Some(&events[0]));

    handle.wait_idle().await;
    assert!(start.elapsed() >= DEFAULT_DWELL * 3);
    assert_eq!(sink.shown(), events);
    assert_eq!(
        sink.calls()
            .into_iter()
            .filter(|call| matches!(call, SinkCall::Sound(_)))
            .count(),
        3
    );
}

#[tokio::test(start_paused = true)]
async fn test_batches_from_two_submissions_do_not_interleave() {
    let sink = Arc::new(RecordingSink::new());
    let (handle, _task) =
        NotificationHandle::spawn(NotificationQueue::new(sink.clone(), DEFAULT_DWELL));
    let store = ProgressStore::load(registry(SMALL_CATALOG), Arc::new(MemoryBackend::new()))
        .with_notifier(handle.clone());

    let first = store.submit_score("digits", "4x4-20", 120.0, false).await;
    let second = store.submit_score("queens", "8-perfect", 70.0, true).await;
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 1);

    handle.wait_idle().await;

    let expected: Vec<_> = first.iter().chain(second.iter()).cloned().collect();
    assert_eq!(sink.shown(), expected);
    assert!(sink.calls().contains(&SinkCall::Sound(SoundCue::Fanfare)));
}

#[tokio::test(start_paused = true)]
async fn test_early_dismiss_moves_to_next_event() {
    let sink = Arc::new(RecordingSink::new());
    let (handle, _task) =
        NotificationHandle::spawn(NotificationQueue::new(sink.clone(), DEFAULT_DWELL));
    let store = ProgressStore::load(registry(SMALL_CATALOG), Arc::new(MemoryBackend::new()))
        .with_notifier(handle.clone());

    let events = store.submit_score("digits", "4x4-20", 120.0, false).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let start = Instant::now();
    handle.dismiss();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(handle.snapshot().current.as_ref(), Some(&events[1]));

    handle.wait_idle().await;
    // The second event still gets its full dwell
    assert!(start.elapsed() >= DEFAULT_DWELL);
    assert!(start.elapsed() < DEFAULT_DWELL * 2);
}

#[tokio::test(start_paused = true)]
async fn test_engine_end_to_end() {
    let mut config = Config::default();
    config.settings.notifications.dwell_ms = 500;

    let backend = Arc::new(MemoryBackend::new());
    let sink = Arc::new(RecordingSink::new());
    let engine = Engine::with_parts(&config, backend.clone(), sink.clone());

    let events = engine.submit_score("schulte", "4x4", 30.0, false).await;
    assert_eq!(events.len(), 1);
    assert!(engine.submit_score("schulte", "4x4", 35.0, false).await.is_empty());
    assert!(engine.submit_score("schulte", "9x9", 1.0, false).await.is_empty());

    let start = Instant::now();
    assert!(engine.shutdown().await);
    assert!(start.elapsed() <= Duration::from_millis(500));

    assert_eq!(sink.shown(), events);
    let doc = backend.document(USER_NAMESPACE).unwrap();
    assert_eq!(doc["scoreHistory"]["schulte"]["4x4"]["attempts"], 2);
    assert_eq!(doc["scoreHistory"]["schulte"]["4x4"]["best"], 30.0);
}
