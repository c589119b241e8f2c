//! Integration tests for the freshness cache behavior.
//!
//! Covered (strict):
//! - MISS → HIT for an identical key within the TTL (the second compute is
//!   never observed)
//! - Expiration: after the TTL the same key recomputes and serves the new
//!   value (absolute TTL, no sliding refresh)
//! - Capacity: inserting past the maximum evicts the oldest entry
//! - Concurrent callers agree on the cached value

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use glance_server::cache::FreshnessCache;
use tokio::time::sleep;

/// Sleep noticeably longer than TTL to avoid boundary flakes.
/// Using 5× TTL gives headroom even on slow CI timers.
async fn sleep_over_ttl(ttl_ms: u64) {
    sleep(Duration::from_millis(ttl_ms.saturating_mul(5))).await;
}

#[tokio::test]
async fn identical_key_hits_within_ttl() {
    let cache: FreshnessCache<String, u32> = FreshnessCache::new(10, Duration::from_secs(30));
    let computed = AtomicUsize::new(0);

    let compute = |v: u32| {
        computed.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<u32, Infallible>(v) }
    };

    let first = cache
        .get_or_compute("cambridge".to_string(), || compute(7))
        .await
        .unwrap();
    let second = cache
        .get_or_compute("cambridge".to_string(), || compute(99))
        .await
        .unwrap();

    assert_eq!(first, 7);
    assert_eq!(second, 7, "cached value, not the fresh compute, must win");
    assert_eq!(computed.load(Ordering::SeqCst), 1, "compute ran exactly once");
}

#[tokio::test]
async fn expired_key_recomputes_and_serves_new_value() {
    const TTL_MS: u64 = 50;
    let cache: FreshnessCache<String, u32> =
        FreshnessCache::new(10, Duration::from_millis(TTL_MS));

    let v1 = cache
        .get_or_compute("k".to_string(), || async { Ok::<u32, Infallible>(1) })
        .await
        .unwrap();
    assert_eq!(v1, 1);

    sleep_over_ttl(TTL_MS).await;

    let v2 = cache
        .get_or_compute("k".to_string(), || async { Ok::<u32, Infallible>(2) })
        .await
        .unwrap();
    assert_eq!(v2, 2, "after TTL expiration the key must recompute");

    // And the refreshed entry is immediately cached again.
    let v3 = cache
        .get_or_compute("k".to_string(), || async { Ok::<u32, Infallible>(3) })
        .await
        .unwrap();
    assert_eq!(v3, 2);
}

#[tokio::test]
async fn capacity_overflow_evicts_the_oldest_key() {
    let cache: FreshnessCache<u32, u32> = FreshnessCache::new(3, Duration::from_secs(30));

    for key in 1..=4u32 {
        cache
            .get_or_compute(key, || async move { Ok::<u32, Infallible>(key * 10) })
            .await
            .unwrap();
    }

    assert_eq!(cache.len(), 3);
    assert!(cache.get(&1).is_none(), "key 1 was oldest and must be gone");
    for key in 2..=4u32 {
        assert_eq!(cache.get(&key), Some(key * 10));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_fresh_value() {
    let cache: Arc<FreshnessCache<&'static str, u64>> =
        Arc::new(FreshnessCache::new(10, Duration::from_secs(30)));

    // Warm the key so every concurrent caller sees a fresh entry.
    cache
        .get_or_compute("shared", || async { Ok::<u64, Infallible>(42) })
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..16u64 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            cache
                .get_or_compute("shared", move || async move {
                    Ok::<u64, Infallible>(1000 + i)
                })
                .await
                .unwrap()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 42);
    }
}
