//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with expiration and priority.

use crate::cache::clock::Timestamp;

// == Cache Entry ==
/// Represents a single cache entry with value and eviction metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<K, V, P> {
    /// Key the entry is indexed under
    pub key: K,
    /// The stored value
    pub value: V,
    /// Absolute expiration timestamp (Unix milliseconds)
    pub expires_at: Timestamp,
    /// Eviction priority, lower values are evicted first
    pub priority: P,
}

impl<K, V, P> CacheEntry<K, V, P> {
    // == Constructor ==
    /// Creates a new cache entry.
    pub fn new(key: K, value: V, expires_at: Timestamp, priority: P) -> Self {
        Self {
            key,
            value,
            expires_at,
            priority,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at time `now`.
    ///
    /// An entry stays valid up to and including its expiration timestamp;
    /// it is expired only once `now` is strictly later.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at < now
    }

    // == Refresh ==
    /// Overwrites value, expiration and priority in place, keeping the key.
    pub fn refresh(&mut self, value: V, expires_at: Timestamp, priority: P) {
        self.value = value;
        self.expires_at = expires_at;
        self.priority = priority;
    }

    /// Returns remaining time to live in milliseconds at `now`, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: Timestamp) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}
