//! Concurrent Cache Handle
//!
//! Thread-safe front end over [`CacheStore`]: one reader/writer lock guards
//! the whole store, and an optional background task sweeps expired entries.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::warn;

use crate::cache::{CacheStore, EstimateSize, StatsSnapshot};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::{spawn_sweeper, Sweep, SweeperHandle};

struct Shared<K, V> {
    store: RwLock<CacheStore<K, V>>,
    sweeper: Mutex<Option<SweeperHandle>>,
    config: Config,
}

impl<K, V> Sweep for Shared<K, V>
where
    K: Hash + Eq + Clone + EstimateSize + Send + Sync + 'static,
    V: EstimateSize + Send + Sync + 'static,
{
    fn sweep(&self) -> usize {
        self.store.write().cleanup_expired()
    }
}

// == Cache ==
/// Generic key-value cache with TTL expiration and bounded capacity.
///
/// Cloning a `Cache` creates a new handle to the same entries. Lookups take
/// the shared lock and may run in parallel; writes, deletes and sweeps take
/// the exclusive lock.
///
/// Eviction follows write order: the entry written least recently is evicted
/// first, and reads do not refresh an entry's position.
///
/// ```
/// use std::time::Duration;
/// use ttl_cache::{Cache, Config};
///
/// let cache = Cache::new(Config::new().with_max_items(2).without_sweeper());
///
/// cache.set("a", 1u32);
/// cache.set_with_ttl("b", 2, Duration::from_secs(60));
/// cache.set("c", 3);
///
/// assert_eq!(cache.get("a"), None);
/// assert_eq!(cache.get("b"), Some(2));
/// assert_eq!(cache.len(), 2);
/// ```
pub struct Cache<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + EstimateSize + Send + Sync + 'static,
    V: EstimateSize + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache with the given bounds.
    ///
    /// When `config.sweep_interval` is set and non-zero, the sweeper is
    /// spawned on the current Tokio runtime. Without a runtime the cache still works, but
    /// expired entries are only reclaimed by [`cleanup_expired`](Self::cleanup_expired)
    /// or by overwrites.
    pub fn new(config: Config) -> Self {
        let shared = Arc::new(Shared {
            store: RwLock::new(CacheStore::new(&config)),
            sweeper: Mutex::new(None),
            config,
        });

        let interval = shared.config.sweep_interval.filter(|i| !i.is_zero());
        if let Some(interval) = interval {
            if tokio::runtime::Handle::try_current().is_ok() {
                let handle = spawn_sweeper(Arc::downgrade(&shared), interval);
                *shared.sweeper.lock() = Some(handle);
            } else {
                warn!("No Tokio runtime available, expiration sweeper not started");
            }
        }

        Self { shared }
    }

    // == Set ==
    /// Stores a value that never expires, overwriting any previous entry.
    pub fn set(&self, key: K, value: V) {
        self.shared.store.write().set(key, value);
    }

    // == Set With TTL ==
    /// Stores a value that expires `ttl` from now. A zero TTL removes the key
    /// instead.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.shared.store.write().set_with_ttl(key, value, ttl);
    }

    // == Get ==
    /// Returns a clone of the value if the key exists and has not expired.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.shared.store.read().get(key).cloned()
    }

    /// Runs `f` on the live value under the shared lock.
    pub fn get_with<Q, R>(&self, key: &Q, f: impl FnOnce(&V) -> R) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.store.read().get(key).map(f)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.store.read().contains_key(key)
    }

    /// Remaining lifetime of a live entry; `Some(None)` if it never expires.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Option<Duration>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.store.read().ttl_remaining(key)
    }

    // == Delete ==
    /// Removes the key. Returns false if it was absent.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.store.write().delete(key)
    }

    // == Length ==
    /// Number of entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.shared.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.store.read().is_empty()
    }

    /// Cumulative estimated size of all entries in bytes.
    pub fn current_size(&self) -> u64 {
        self.shared.store.read().current_size()
    }

    // == Clear ==
    pub fn clear(&self) {
        self.shared.store.write().clear();
    }

    // == Cleanup Expired ==
    /// Removes every entry whose TTL has elapsed and returns how many were
    /// removed. Works whether or not the sweeper is running.
    pub fn cleanup_expired(&self) -> usize {
        self.shared.sweep()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.store.read().stats()
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Returns true while a background sweeper is attached to this cache.
    pub fn has_sweeper(&self) -> bool {
        self.shared
            .sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Close ==
    /// Stops the background sweeper and waits for it to exit.
    ///
    /// Stored entries stay readable and writable afterwards; only automatic
    /// reclamation of expired entries stops. Calling `close` again is a
    /// no-op.
    pub async fn close(&self) -> Result<()> {
        let handle = self.shared.sweeper.lock().take();
        match handle {
            Some(handle) => handle.shutdown().await,
            None => Ok(()),
        }
    }
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}
