//! TTL Cache - A generic in-process key-value cache
//!
//! Provides bounded capacity (item count and/or estimated byte size),
//! per-entry TTL expiration and safe concurrent access.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use ttl_cache::{Cache, Config};
//!
//! let cache = Cache::new(Config::new().with_max_size(4096).without_sweeper());
//!
//! cache.set_with_ttl("session".to_string(), "user123".to_string(), Duration::from_secs(2));
//! assert_eq!(cache.get("session"), Some("user123".to_string()));
//! assert!(cache.current_size() > 0);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStore, EstimateSize, StatsSnapshot};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweeper;
