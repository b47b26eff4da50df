//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and count/size-bounded
//! eviction.

mod entry;
mod expiration;
mod handle;
mod recency;
mod size;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use expiration::ExpirationQueue;
pub use handle::Cache;
pub use recency::{NodeId, RecencyList};
pub use size::{EstimateSize, SizeEstimator, ENTRY_OVERHEAD};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;
