//! Cache Store Module
//!
//! Main cache engine combining a key index with the recency ring, TTL
//! expiration and priority eviction.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::clock::{Clock, SystemClock, Timestamp};
use crate::cache::entry::CacheEntry;
use crate::cache::ring::{Handle, RecencyRing};
use crate::cache::CacheStats;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Priority Cache ==
/// Fixed-capacity cache with TTL expiration and priority eviction.
///
/// The key index maps each key to a handle into the recency ring, which owns
/// the entries. Both structures are always updated together, so every key in
/// the index has exactly one linked entry in the ring and vice versa.
///
/// When a new key arrives at full capacity, expired entries are purged first;
/// if the cache is still full, the entry with the lowest priority is evicted,
/// with ties going to the least recently used one.
///
/// The cache is single-threaded. To share it, wrap the whole cache in one
/// mutex held for the duration of each call.
#[derive(Debug)]
pub struct PriorityCache<K, V, P = u32, C = SystemClock> {
    /// Key to ring slot mapping
    pub(super) index: HashMap<K, Handle>,
    /// Entries ordered by recency
    pub(super) ring: RecencyRing<K, V, P>,
    /// Performance statistics
    pub(super) stats: CacheStats,
    /// Time source for expiration checks
    pub(super) clock: C,
    /// Maximum number of entries allowed
    capacity: usize,
    /// TTL for inserts that don't supply one
    default_ttl: Duration,
}

impl<K, V, P> PriorityCache<K, V, P, SystemClock>
where
    K: Hash + Eq + Clone + Debug,
    P: Ord,
{
    // == Constructor ==
    /// Creates a cache holding at most `capacity` entries, timed by the wall clock.
    ///
    /// Fails with [`CacheError::InvalidConfig`] when `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_clock(capacity, SystemClock)
    }

    /// Creates a cache from a [`CacheConfig`], timed by the wall clock.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::from_config_with_clock(config, SystemClock)
    }
}

impl<K, V, P, C> PriorityCache<K, V, P, C>
where
    K: Hash + Eq + Clone + Debug,
    P: Ord,
    C: Clock,
{
    /// Creates a cache that reads time from `clock`.
    pub fn with_clock(capacity: usize, clock: C) -> Result<Self> {
        let config = CacheConfig {
            capacity,
            ..CacheConfig::default()
        };
        Self::from_config_with_clock(&config, clock)
    }

    /// Creates a cache from a [`CacheConfig`] that reads time from `clock`.
    pub fn from_config_with_clock(config: &CacheConfig, clock: C) -> Result<Self> {
        config.validate()?;
        debug!(
            capacity = config.capacity,
            default_ttl = config.default_ttl,
            "priority cache initialized"
        );
        Ok(Self {
            index: HashMap::with_capacity(config.capacity),
            ring: RecencyRing::with_capacity(config.capacity),
            stats: CacheStats::new(),
            clock,
            capacity: config.capacity,
            default_ttl: Duration::from_secs(config.default_ttl),
        })
    }

    // == Insert ==
    /// Stores a key-value pair expiring at `expires_at`.
    ///
    /// An existing key is overwritten in place and becomes most recently used,
    /// without triggering eviction. A new key at full capacity first runs the
    /// eviction pass, which frees at least one slot.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `expires_at` - Absolute expiration timestamp on the cache's clock
    /// * `priority` - Eviction priority, lower values are evicted first
    pub fn insert(&mut self, key: K, value: V, expires_at: Timestamp, priority: P) {
        if let Some(&handle) = self.index.get(&key) {
            self.refresh(handle, value, expires_at, priority);
            return;
        }

        if self.index.len() >= self.capacity {
            self.evict();
        }

        let entry = CacheEntry::new(key.clone(), value, expires_at, priority);
        let handle = self.ring.push_front(entry);
        self.index.insert(key, handle);
    }

    /// Stores a key-value pair expiring `ttl` from now.
    ///
    /// Uses the configured default TTL when `ttl` is None.
    pub fn insert_with_ttl(&mut self, key: K, value: V, ttl: Option<Duration>, priority: P) {
        let expires_at = self.clock.deadline_after(ttl.unwrap_or(self.default_ttl));
        self.insert(key, value, expires_at, priority);
    }

    // == Update ==
    /// Overwrites an existing entry in place and marks it most recently used.
    ///
    /// Returns false, changing nothing, if the key is absent.
    pub fn update<Q>(&mut self, key: &Q, value: V, expires_at: Timestamp, priority: P) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key) {
            Some(&handle) => {
                self.refresh(handle, value, expires_at, priority);
                true
            }
            None => false,
        }
    }

    // == Get ==
    /// Retrieves a value by key and marks it most recently used.
    ///
    /// An entry whose expiration has passed is removed and reported as absent.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let Some(&handle) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let expired = self
            .ring
            .get(handle)
            .map_or(true, |entry| entry.is_expired(now));
        if expired {
            if let Some(entry) = self.remove_handle(handle) {
                trace!(key = ?entry.key, "expired entry removed on read");
                self.stats.record_expirations(1);
            }
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.ring.touch(handle);
        self.ring.get(handle).map(|entry| &entry.value)
    }

    // == Peek ==
    /// Returns a live value without changing recency or removing anything.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let handle = self.index.get(key)?;
        self.ring
            .get(*handle)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| &entry.value)
    }

    /// Returns true if the key holds a live, unexpired entry.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.peek(key).is_some()
    }

    // == Delete ==
    /// Removes an entry by key, returning its value.
    ///
    /// Absent keys are a no-op.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.index.get(key)?;
        self.remove_handle(handle).map(|entry| entry.value)
    }

    // == Snapshot ==
    /// Reads every key through [`get`](Self::get) and returns the live values,
    /// most recently used first.
    ///
    /// Keys are copied out before reading since reads may expire entries.
    /// They are read from least to most recently used so the recency order is
    /// the same afterwards.
    pub fn snapshot(&mut self) -> Vec<V>
    where
        V: Clone,
    {
        let keys: Vec<K> = self
            .ring
            .iter_lru()
            .map(|(_, entry)| entry.key.clone())
            .collect();

        let mut values: Vec<V> = keys
            .iter()
            .filter_map(|key| self.get(key).cloned())
            .collect();
        values.reverse();
        values
    }

    /// Iterates keys from most to least recently used, expired ones included.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.ring.iter().map(|(_, entry)| &entry.key)
    }

    // == Length ==
    /// Returns the current number of entries, including not yet purged expired ones.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the fixed maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the cache's clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    // == Check Invariants ==
    /// Verifies ring linkage, the index/ring bijection and the capacity bound.
    pub fn check_invariants(&self) -> Result<()> {
        let handles = self.ring.check_links()?;
        if self.ring.len() != self.index.len() {
            return Err(CacheError::InvariantViolation(format!(
                "index has {} keys but ring links {} entries",
                self.index.len(),
                self.ring.len()
            )));
        }

        for handle in handles {
            let entry = self.ring.get(handle).ok_or_else(|| {
                CacheError::InvariantViolation("linked slot holds no entry".to_string())
            })?;
            if self.index.get(&entry.key) != Some(&handle) {
                return Err(CacheError::InvariantViolation(format!(
                    "ring entry {:?} is not indexed at its slot",
                    entry.key
                )));
            }
        }

        if self.index.len() > self.capacity {
            return Err(CacheError::InvariantViolation(format!(
                "{} entries exceed capacity {}",
                self.index.len(),
                self.capacity
            )));
        }
        Ok(())
    }

    // Overwrites an entry and moves it to the front.
    fn refresh(&mut self, handle: Handle, value: V, expires_at: Timestamp, priority: P) {
        if let Some(entry) = self.ring.get_mut(handle) {
            entry.refresh(value, expires_at, priority);
        }
        self.ring.touch(handle);
    }

    // Removes an entry from the ring and the index together.
    pub(super) fn remove_handle(&mut self, handle: Handle) -> Option<CacheEntry<K, V, P>> {
        let entry = self.ring.remove(handle)?;
        self.index.remove(&entry.key);
        Some(entry)
    }
}
