//! Cache Entry Module
//!
//! Defines the record stored for each key, with its TTL and bookkeeping.

use std::time::{Duration, Instant};

use crate::cache::recency::NodeId;

// == Cache Entry ==
/// A single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Time to live, None = never expires
    pub ttl: Option<Duration>,
    /// Creation (or last overwrite) instant
    pub created_at: Instant,
    /// Estimated size in bytes, overhead included
    pub size: u64,
    /// Position in the recency list
    pub(crate) node: NodeId,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    pub(crate) fn new(
        value: V,
        ttl: Option<Duration>,
        size: u64,
        node: NodeId,
        created_at: Instant,
    ) -> Self {
        Self {
            value,
            ttl,
            created_at,
            size,
            node,
        }
    }

    // == Replace ==
    /// Overwrites value, TTL, creation instant and size in place. The recency
    /// node is kept.
    pub(crate) fn replace(&mut self, value: V, ttl: Option<Duration>, size: u64, now: Instant) {
        self.value = value;
        self.ttl = ttl;
        self.created_at = now;
        self.size = size;
    }

    // == Expires At ==
    /// Instant at which the entry stops being readable, None if it never
    /// expires or its deadline lies beyond what `Instant` can represent.
    pub fn expires_at(&self) -> Option<Instant> {
        self.ttl.and_then(|ttl| self.created_at.checked_add(ttl))
    }

    // == Is Expired ==
    /// Checks the entry against its own creation time and TTL.
    ///
    /// Boundary condition: valid while `now - created_at < ttl`, so the entry
    /// is expired from the exact instant the TTL has fully elapsed.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(self.created_at) >= ttl,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the TTL has elapsed
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires, a TTL too long to represent
    ///   included
    pub fn ttl_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.expires_at()
            .map(|expires| expires.saturating_duration_since(now))
    }
}
