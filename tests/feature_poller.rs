//! Poll-cycle tests: clean publishes, failure containment, overflow policy.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use botgate::config::{FeaturePollConfig, OverflowPolicy};
use botgate::features::{
    FeatureCache, FeaturePoller, FeatureSnapshot, FeatureState, FeatureTable, PollError,
};
use botgate::lifecycle::Shutdown;

mod common;

fn poll_config(provider: SocketAddr, policy: OverflowPolicy) -> FeaturePollConfig {
    FeaturePollConfig {
        url: format!("http://{}/bot_features", provider),
        poll_interval_secs: 1,
        fetch_timeout_secs: 2,
        table_capacity: 4,
        on_overflow: policy,
    }
}

fn seed_rows(cache: &FeatureCache, names: &[&str]) {
    cache.publish(FeatureState {
        snapshot: FeatureSnapshot {
            row_count: names.len(),
            refreshed_at: SystemTime::now(),
        },
        table: FeatureTable::from_names(4, names).unwrap(),
    });
}

#[tokio::test]
async fn clean_cycle_publishes_snapshot_and_table() {
    let feed = common::feature_feed(&["ua", "ip", "path", "ts"]);
    let provider = common::start_programmable_backend(move || {
        let feed = feed.clone();
        async move { (200, feed) }
    })
    .await;

    let cache = Arc::new(FeatureCache::empty(4));
    let shutdown = Arc::new(Shutdown::new());
    let poller = FeaturePoller::new(&poll_config(provider, OverflowPolicy::Retry), cache.clone(), shutdown).unwrap();

    let rows = poller.poll_once().await.unwrap();
    assert_eq!(rows, 4);

    let state = cache.load();
    assert_eq!(state.snapshot.row_count, 4);
    assert_eq!(
        state.table.names().collect::<Vec<_>>(),
        vec!["ua", "ip", "path", "ts"]
    );
}

#[tokio::test]
async fn duplicate_names_are_logged_not_rejected() {
    let feed = common::feature_feed(&["ua", "ua", "ip"]);
    let provider = common::start_programmable_backend(move || {
        let feed = feed.clone();
        async move { (200, feed) }
    })
    .await;

    let cache = Arc::new(FeatureCache::empty(4));
    let shutdown = Arc::new(Shutdown::new());
    let poller = FeaturePoller::new(&poll_config(provider, OverflowPolicy::Retry), cache.clone(), shutdown).unwrap();

    assert_eq!(poller.poll_once().await.unwrap(), 3);
    let state = cache.load();
    assert_eq!(state.snapshot.row_count, 3);
    assert_eq!(state.table.names().collect::<Vec<_>>(), vec!["ua", "ua", "ip"]);
}

#[tokio::test]
async fn non_200_keeps_stale_snapshot() {
    let provider =
        common::start_programmable_backend(|| async { (500, "boom".into()) }).await;

    let cache = Arc::new(FeatureCache::empty(4));
    seed_rows(&cache, &["ua", "ip", "path"]);

    let shutdown = Arc::new(Shutdown::new());
    let poller = FeaturePoller::new(&poll_config(provider, OverflowPolicy::Retry), cache.clone(), shutdown).unwrap();

    let err = poller.poll_once().await.unwrap_err();
    assert!(matches!(err, PollError::Status(_)), "got: {err}");
    assert_eq!(cache.row_count(), 3, "stale snapshot must survive");
}

#[tokio::test]
async fn malformed_payload_keeps_stale_snapshot() {
    let provider =
        common::start_programmable_backend(|| async { (200, "not json at all".into()) }).await;

    let cache = Arc::new(FeatureCache::empty(4));
    seed_rows(&cache, &["ua", "ip", "path"]);

    let shutdown = Arc::new(Shutdown::new());
    let poller = FeaturePoller::new(&poll_config(provider, OverflowPolicy::Retry), cache.clone(), shutdown).unwrap();

    let err = poller.poll_once().await.unwrap_err();
    assert!(matches!(err, PollError::Parse(_)), "got: {err}");
    assert_eq!(cache.row_count(), 3);
}

#[tokio::test]
async fn fetch_timeout_is_a_recoverable_failure() {
    let provider = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, "too late".into())
    })
    .await;

    let cache = Arc::new(FeatureCache::empty(4));
    let shutdown = Arc::new(Shutdown::new());
    let mut config = poll_config(provider, OverflowPolicy::Retry);
    config.fetch_timeout_secs = 1;
    let poller = FeaturePoller::new(&config, cache.clone(), shutdown).unwrap();

    let err = poller.poll_once().await.unwrap_err();
    assert!(matches!(err, PollError::Timeout), "got: {err}");
    assert_eq!(cache.row_count(), 0);
}

#[tokio::test]
async fn overflow_under_retry_drops_cycle_and_keeps_polling() {
    let cycles = Arc::new(AtomicU32::new(0));
    let seen = cycles.clone();
    let feed = common::feature_feed(&["a", "b", "c", "d", "e", "f"]);
    let provider = common::start_programmable_backend(move || {
        let feed = feed.clone();
        seen.fetch_add(1, Ordering::SeqCst);
        async move { (200, feed) }
    })
    .await;

    let cache = Arc::new(FeatureCache::empty(4));
    seed_rows(&cache, &["ua", "ip", "path"]);

    let shutdown = Arc::new(Shutdown::new());
    let poller = FeaturePoller::new(
        &poll_config(provider, OverflowPolicy::Retry),
        cache.clone(),
        shutdown.clone(),
    )
    .unwrap();

    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        poller.run(rx).await;
    });

    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert!(
        cycles.load(Ordering::SeqCst) >= 2,
        "poller should keep scheduling cycles after overflow"
    );
    assert_eq!(cache.row_count(), 3, "overflowing cycles must never publish");
    assert!(!shutdown.is_fatal());

    shutdown.trigger();
}

#[tokio::test]
async fn overflow_under_crash_signals_fatal_shutdown_without_publishing() {
    let feed = common::feature_feed(&["a", "b", "c", "d", "e", "f"]);
    let provider = common::start_programmable_backend(move || {
        let feed = feed.clone();
        async move { (200, feed) }
    })
    .await;

    let cache = Arc::new(FeatureCache::empty(4));
    seed_rows(&cache, &["ua", "ip", "path"]);

    let shutdown = Arc::new(Shutdown::new());
    let mut observer = shutdown.subscribe();
    let poller = FeaturePoller::new(
        &poll_config(provider, OverflowPolicy::Crash),
        cache.clone(),
        shutdown.clone(),
    )
    .unwrap();

    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        poller.run(rx).await;
    });

    tokio::time::timeout(Duration::from_secs(3), observer.recv())
        .await
        .expect("shutdown signal should arrive")
        .unwrap();

    assert!(shutdown.is_fatal());
    assert_eq!(
        cache.row_count(),
        3,
        "the last published snapshot must remain visible"
    );
}
