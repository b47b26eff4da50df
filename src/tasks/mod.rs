//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is alive.
//!
//! # Tasks
//! - Expiration sweep: removes expired cache entries at a configured interval

mod sweeper;

pub use sweeper::{spawn_sweeper, Sweep, SweeperHandle, MIN_SWEEP_INTERVAL};
