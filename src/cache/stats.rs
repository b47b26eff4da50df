//! Cache Statistics Module
//!
//! Tracks hits, misses, evictions and expirations.
//!
//! Counters are atomic so reads can record hits and misses while holding
//! only the shared lock.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Live cache counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a lookup that found nothing or an expired entry.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts an entry removed to satisfy a capacity bound.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts entries removed because their TTL elapsed.
    pub fn record_expirations(&self, count: usize) {
        self.expirations.fetch_add(count as u64, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the counters together with the current entry count and size.
    pub fn snapshot(&self, entries: usize, size_bytes: u64) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            entries,
            size_bytes,
        }
    }
}

// == Stats Snapshot ==
/// Point-in-time copy of the cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of failed lookups (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted under capacity pressure
    pub evictions: u64,
    /// Number of expired entries reclaimed by sweeps
    pub expirations: u64,
    /// Current number of entries
    pub entries: usize,
    /// Current estimated size in bytes
    pub size_bytes: u64,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let snapshot = CacheStats::new().snapshot(0, 0);
        assert_eq!(snapshot, StatsSnapshot::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().snapshot(0, 0).hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.snapshot(0, 0).hit_rate(), 1.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.snapshot(0, 0).hit_rate(), 0.5);
    }

    #[test]
    fn test_record_evictions_and_expirations() {
        let stats = CacheStats::new();
        stats.record_eviction();
        stats.record_eviction();
        stats.record_expirations(3);

        let snapshot = stats.snapshot(42, 1024);
        assert_eq!(snapshot.evictions, 2);
        assert_eq!(snapshot.expirations, 3);
        assert_eq!(snapshot.entries, 42);
        assert_eq!(snapshot.size_bytes, 1024);
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = CacheStats::new();
        stats.record_hit();

        let json = serde_json::to_value(stats.snapshot(1, 55)).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["misses"], 0);
        assert_eq!(json["entries"], 1);
        assert_eq!(json["size_bytes"], 55);
    }
}
