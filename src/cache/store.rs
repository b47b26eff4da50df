//! Cache Store Module
//!
//! Main cache engine: a HashMap of entries plus a recency list for eviction,
//! an expiration queue for TTLs, and a size estimator for the byte bound.
//!
//! `CacheStore` is not synchronized; [`Cache`](crate::Cache) wraps it in a
//! reader/writer lock.
//!
//! # Eviction
//! Victims are picked in write order: the entry written least recently goes
//! first. Reads never change the order.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{
    CacheEntry, CacheStats, EstimateSize, ExpirationQueue, RecencyList, SizeEstimator,
    StatsSnapshot,
};
use crate::config::Config;

// == Cache Store ==
/// Cache storage with count/size-bounded eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Write-order tracker
    recency: RecencyList<K>,
    /// Pending expirations of entries with a TTL
    expirations: ExpirationQueue<K>,
    /// Entry cost estimator
    estimator: SizeEstimator<K, V>,
    /// Sum of all entry sizes
    size_bytes: u64,
    /// Maximum number of entries, None = unbounded
    max_items: Option<usize>,
    /// Maximum cumulative size in bytes, None = unbounded
    max_size: Option<u64>,
    /// Performance statistics
    stats: CacheStats,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone + EstimateSize,
    V: EstimateSize,
{
    // == Constructor ==
    /// Creates an empty store with the bounds of `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_limits(config.max_items, config.max_size)
    }

    /// Creates an empty store with explicit bounds.
    ///
    /// # Arguments
    /// * `max_items` - Maximum number of entries, None = unbounded
    /// * `max_size` - Maximum cumulative estimated size, None = unbounded
    pub fn with_limits(max_items: Option<usize>, max_size: Option<u64>) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyList::new(),
            expirations: ExpirationQueue::new(),
            estimator: SizeEstimator::new(),
            size_bytes: 0,
            max_items,
            max_size,
            stats: CacheStats::new(),
        }
    }

    // == Set ==
    /// Stores a key-value pair that never expires.
    ///
    /// If the key already exists, its value is overwritten in place, any
    /// previous TTL is dropped and the entry becomes the newest. Entries are
    /// evicted oldest-first until the write fits the configured bounds.
    pub fn set(&mut self, key: K, value: V) {
        self.insert(key, value, None);
    }

    // == Set With TTL ==
    /// Stores a key-value pair that expires `ttl` after this call.
    ///
    /// A zero TTL stores nothing: any existing entry for the key is removed
    /// and the key is absent once the call returns.
    pub fn set_with_ttl(&mut self, key: K, value: V, ttl: Duration) {
        if ttl.is_zero() {
            if self.remove_entry(&key).is_some() {
                debug!("zero TTL write removed existing entry");
            }
            return;
        }
        self.insert(key, value, Some(ttl));
    }

    fn insert(&mut self, key: K, value: V, ttl: Option<Duration>) {
        let now = Instant::now();
        let size = self.estimator.entry_size(&key, &value);
        let old_size = self.entries.get(&key).map(|entry| entry.size);

        self.make_room(&key, old_size, size);
        self.size_bytes = self.size_bytes - old_size.unwrap_or(0) + size;

        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.replace(value, ttl, size, now);
                self.recency.move_to_back(entry.node);
            }
            None => {
                let node = self.recency.push_back(key.clone());
                self.entries
                    .insert(key.clone(), CacheEntry::new(value, ttl, size, node, now));
            }
        }

        // A rewrite always supersedes the previous schedule. A deadline past
        // the clock's range is never reached, so it gets no slot.
        match ttl.and_then(|ttl| now.checked_add(ttl)) {
            Some(deadline) => self.expirations.push(key, deadline),
            None => {
                self.expirations.remove(&key);
            }
        }
    }

    // == Make Room ==
    /// Evicts entries until writing `new_size` bytes under `key` respects
    /// both bounds, or until only the entry being written is left.
    ///
    /// The count bound is checked the same way for inserts and updates: while
    /// the store holds `max_items` or more entries, the oldest other entry
    /// goes. An update of a full store therefore shrinks it by one.
    fn make_room(&mut self, key: &K, old_size: Option<u64>, new_size: u64) {
        let is_update = old_size.is_some();

        loop {
            let projected = self.size_bytes - old_size.unwrap_or(0) + new_size;

            let over_count = self.max_items.is_some_and(|max| self.entries.len() >= max);
            let over_size = self.max_size.is_some_and(|max| projected > max);
            if !over_count && !over_size {
                break;
            }

            let Some(victim) = self.pick_victim(key, is_update) else {
                break;
            };
            if let Some(evicted) = self.remove_entry(&victim) {
                self.stats.record_eviction();
                debug!(
                    size = evicted.size,
                    over_count, over_size, "evicted oldest entry"
                );
            }
        }
    }

    /// Oldest entry other than the one being written.
    fn pick_victim(&self, key: &K, is_update: bool) -> Option<K> {
        if is_update && self.entries.len() <= 1 {
            return None;
        }

        let oldest = self.recency.front()?;
        if is_update && oldest == key {
            self.recency.second().cloned()
        } else {
            Some(oldest.clone())
        }
    }

    // == Get ==
    /// Returns the value if the key exists and its TTL has not elapsed.
    ///
    /// Expired entries are reported as missing but left in place for the
    /// next sweep. The recency order is not touched.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_entry(key).map(|entry| &entry.value)
    }

    /// Like [`get`](Self::get) but returns the whole entry with its metadata.
    pub fn get_entry<Q>(&self, key: &Q) -> Option<&CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.live_entry(key, Instant::now()) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Returns true if the key holds a live entry. Not counted in stats.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live_entry(key, Instant::now()).is_some()
    }

    /// Remaining lifetime of a live entry; `Some(None)` if it never expires.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Option<Duration>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.live_entry(key, now)
            .map(|entry| entry.ttl_remaining_at(now))
    }

    fn live_entry<Q>(&self, key: &Q, now: Instant) -> Option<&CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
    }

    // == Delete ==
    /// Removes an entry by key. Returns false if the key was absent.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    /// Removes an entry from the map, the recency list and the expiration
    /// queue, and releases its size.
    fn remove_entry<Q>(&mut self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        self.size_bytes -= entry.size;
        self.recency.remove(entry.node);
        self.expirations.remove(key);
        Some(entry)
    }

    // == Cleanup Expired ==
    /// Removes every entry whose TTL has elapsed.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    /// Drains the expiration queue up to `now`.
    ///
    /// Each due slot is checked against the entry's own creation time and
    /// TTL before the entry is removed.
    pub(crate) fn cleanup_expired_at(&mut self, now: Instant) -> usize {
        let mut removed = 0;

        while let Some((key, _)) = self.expirations.pop_expired(now) {
            let expired = self
                .entries
                .get(&key)
                .is_some_and(|entry| entry.is_expired_at(now));

            if expired && self.remove_entry(&key).is_some() {
                removed += 1;
            }
        }

        if removed > 0 {
            self.stats.record_expirations(removed);
        }
        removed
    }

    // == Clear ==
    /// Removes all entries. Statistics counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.expirations.clear();
        self.size_bytes = 0;
    }

    // == Length ==
    /// Returns the current number of entries, expired ones awaiting a sweep
    /// included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Current Size ==
    /// Returns the cumulative estimated size of all entries in bytes.
    pub fn current_size(&self) -> u64 {
        self.size_bytes
    }

    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    pub fn max_size(&self) -> Option<u64> {
        self.max_size
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.entries.len(), self.size_bytes)
    }

    /// Keys from oldest to newest write.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.recency.iter()
    }

    /// Asserts the structural invariants shared by the map, the recency list
    /// and the expiration queue.
    #[cfg(test)]
    pub(crate) fn validate(&self) {
        assert_eq!(self.entries.len(), self.recency.len());
        assert_eq!(self.recency.iter().count(), self.recency.len());
        for key in self.recency.iter() {
            assert!(self.entries.contains_key(key));
        }

        let with_ttl = self
            .entries
            .values()
            .filter(|e| e.expires_at().is_some())
            .count();
        assert_eq!(self.expirations.len(), with_ttl);
        for (key, entry) in &self.entries {
            assert_eq!(self.expirations.deadline(key), entry.expires_at());
        }
        self.expirations.validate();

        let total: u64 = self.entries.values().map(|e| e.size).sum();
        assert_eq!(self.size_bytes, total);
    }
}
