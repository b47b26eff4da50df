//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Ordinary cache outcomes
//! (missing keys, expired entries, deleting absent keys) are not errors; this
//! type only covers configuration and background task failures.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A configuration value could not be parsed
    #[error("Invalid configuration value for {name}: {value:?}")]
    InvalidConfig {
        /// Name of the setting (environment variable)
        name: &'static str,
        /// The rejected raw value
        value: String,
    },

    /// The background sweeper task panicked or was cancelled abnormally
    #[error("Sweeper task failed: {0}")]
    Sweeper(#[from] tokio::task::JoinError),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
