//! # Freshness Cache
//! Key→value memoization with a fixed time-to-live and a maximum entry
//! count, shared across concurrent request workers.
//!
//! The guarantee is bounded staleness, not exactly-once computation: two
//! workers racing on a cold key may both run the compute function once, and
//! the later result wins. An expired entry is indistinguishable from a miss.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use metrics::counter;

/// Maximum number of entries kept before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 100;

/// How long a cached value stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60); // 1 hour

#[derive(Debug)]
struct Entry<V> {
    value: V,
    created_at: Instant,
}

#[derive(Debug)]
struct Store<K, V> {
    map: HashMap<K, Entry<V>>,
    /// Keys in creation order; front is the eviction candidate.
    order: VecDeque<K>,
}

/// Thread-safe TTL cache. The lock is only held for map bookkeeping, never
/// across the compute future.
#[derive(Debug)]
pub struct FreshnessCache<K, V> {
    inner: Mutex<Store<K, V>>,
    ttl: Duration,
    capacity: usize,
}

impl<K, V> FreshnessCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Store {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    /// Returns the cached value if present and younger than the TTL.
    /// An expired entry is dropped on the spot and reported as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut store = self.inner.lock().expect("cache mutex poisoned");
        let expired = match store.map.get(key) {
            Some(entry) if entry.created_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            store.map.remove(key);
            store.order.retain(|k| k != key);
        }
        None
    }

    /// Returns the fresh cached value for `key`, or runs `compute` and
    /// stores its result. A failing compute stores nothing; the error
    /// propagates and the next caller recomputes.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            counter!("cache_hits_total").increment(1);
            return Ok(value);
        }
        counter!("cache_misses_total").increment(1);

        let value = compute().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    fn insert(&self, key: K, value: V) {
        let mut store = self.inner.lock().expect("cache mutex poisoned");

        // Refresh in place keeps a single order slot per key.
        if store.map.contains_key(&key) {
            store.order.retain(|k| k != &key);
        }
        while store.map.len() >= self.capacity && !store.map.contains_key(&key) {
            match store.order.pop_front() {
                Some(oldest) => {
                    store.map.remove(&oldest);
                }
                None => break,
            }
        }

        store.order.push_back(key.clone());
        store.map.insert(
            key,
            Entry {
                value,
                created_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache mutex poisoned").map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
