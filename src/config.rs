//! Configuration Module
//!
//! Capacity bounds and sweeper settings, constructed directly or loaded from
//! environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default interval between background expiration sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

const MAX_ITEMS_VAR: &str = "CACHE_MAX_ITEMS";
const MAX_SIZE_VAR: &str = "CACHE_MAX_SIZE";
const SWEEP_INTERVAL_VAR: &str = "CACHE_SWEEP_INTERVAL_SECS";

/// Cache configuration parameters.
///
/// Both bounds are optional and independent; `None` means unbounded along
/// that axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of live entries
    pub max_items: Option<usize>,
    /// Maximum cumulative estimated size in bytes
    pub max_size: Option<u64>,
    /// Interval of the background sweeper, None = no sweeper
    pub sweep_interval: Option<Duration>,
}

impl Config {
    // == Constructor ==
    /// Creates an unbounded configuration with the default sweep interval.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of entries.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Sets the maximum cumulative estimated size in bytes.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Sets the interval between background sweeps. A zero interval
    /// disables the sweeper, as `CACHE_SWEEP_INTERVAL_SECS=0` does.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    /// Disables the background sweeper. Expired entries are still hidden
    /// from reads and can be reclaimed with `cleanup_expired`.
    pub fn without_sweeper(mut self) -> Self {
        self.sweep_interval = None;
        self
    }

    // == From Env ==
    /// Creates a Config from environment variables, falling back to defaults
    /// for missing or malformed values.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ITEMS` - Maximum entries (default: unbounded)
    /// - `CACHE_MAX_SIZE` - Maximum size in bytes (default: unbounded)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Sweep frequency in seconds, 0 disables
    ///   the sweeper (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_items: env::var(MAX_ITEMS_VAR).ok().and_then(|v| v.parse().ok()),
            max_size: env::var(MAX_SIZE_VAR).ok().and_then(|v| v.parse().ok()),
            sweep_interval: env::var(SWEEP_INTERVAL_VAR)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map_or(defaults.sweep_interval, interval_from_secs),
        }
    }

    /// Strict variant of [`Config::from_env`]: malformed values are reported
    /// instead of ignored.
    pub fn try_from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            max_items: parse_var(MAX_ITEMS_VAR)?,
            max_size: parse_var(MAX_SIZE_VAR)?,
            sweep_interval: parse_var::<u64>(SWEEP_INTERVAL_VAR)?
                .map_or(defaults.sweep_interval, interval_from_secs),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_items: None,
            max_size: None,
            sweep_interval: Some(DEFAULT_SWEEP_INTERVAL),
        }
    }
}

fn interval_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CacheError::InvalidConfig { name, value: raw }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_items, None);
        assert_eq!(config.max_size, None);
        assert_eq!(config.sweep_interval, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_config_builders() {
        let config = Config::new()
            .with_max_items(10)
            .with_max_size(1024)
            .with_sweep_interval(Duration::from_millis(250));

        assert_eq!(config.max_items, Some(10));
        assert_eq!(config.max_size, Some(1024));
        assert_eq!(config.sweep_interval, Some(Duration::from_millis(250)));
        assert_eq!(config.without_sweeper().sweep_interval, None);
    }

    #[test]
    fn test_config_zero_sweep_interval_disables_sweeper() {
        let config = Config::new().with_sweep_interval(Duration::ZERO);
        assert_eq!(config.sweep_interval, None);
    }

    // Env vars are process-global, so every env scenario runs in one test.
    #[test]
    fn test_config_from_env() {
        env::remove_var(MAX_ITEMS_VAR);
        env::remove_var(MAX_SIZE_VAR);
        env::remove_var(SWEEP_INTERVAL_VAR);
        assert_eq!(Config::from_env(), Config::default());
        assert_eq!(Config::try_from_env().unwrap(), Config::default());

        env::set_var(MAX_ITEMS_VAR, "500");
        env::set_var(MAX_SIZE_VAR, "65536");
        env::set_var(SWEEP_INTERVAL_VAR, "0");
        let config = Config::try_from_env().unwrap();
        assert_eq!(config.max_items, Some(500));
        assert_eq!(config.max_size, Some(65536));
        assert_eq!(config.sweep_interval, None);

        env::set_var(MAX_ITEMS_VAR, "many");
        assert!(matches!(
            Config::try_from_env(),
            Err(CacheError::InvalidConfig {
                name: MAX_ITEMS_VAR,
                ..
            })
        ));
        assert_eq!(Config::from_env().max_items, None);

        env::remove_var(MAX_ITEMS_VAR);
        env::remove_var(MAX_SIZE_VAR);
        env::remove_var(SWEEP_INTERVAL_VAR);
    }
}
