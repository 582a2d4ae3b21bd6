//! Eviction Module
//!
//! Frees room for a new key in two ordered phases:
//!
//! 1. Expiration sweep: every entry whose expiration has passed is removed,
//!    wherever it sits in the recency order.
//! 2. Priority eviction: if the cache is still full, exactly one entry with
//!    the lowest priority is removed. Among equal priorities the least
//!    recently used one goes.

use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::cache::clock::{Clock, Timestamp};
use crate::cache::ring::Handle;
use crate::cache::PriorityCache;

// == Eviction Outcome ==
/// What a single eviction pass removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EvictionOutcome<K> {
    /// Entries dropped by the expiration sweep
    pub expired: usize,
    /// Key removed by priority eviction, if that phase ran
    pub evicted: Option<K>,
}

impl<K, V, P, C> PriorityCache<K, V, P, C>
where
    K: Hash + Eq + Clone + Debug,
    P: Ord,
    C: Clock,
{
    // == Evict ==
    /// Runs one eviction pass, leaving at least one free slot.
    pub(super) fn evict(&mut self) -> EvictionOutcome<K> {
        let now = self.clock.now();
        let expired = self.sweep_expired(now);

        let evicted = if self.index.len() >= self.capacity() {
            self.evict_lowest_priority()
        } else {
            None
        };

        let outcome = EvictionOutcome { expired, evicted };
        debug!(
            expired = outcome.expired,
            evicted = ?outcome.evicted,
            remaining = self.index.len(),
            "eviction pass"
        );
        outcome
    }

    // == Purge Expired ==
    /// Removes all expired entries now, returning how many were dropped.
    ///
    /// Eviction and reads already do this lazily; this is for callers that
    /// want to reclaim memory on their own schedule.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let removed = self.sweep_expired(now);
        if removed > 0 {
            debug!(removed, "purged expired entries");
        }
        removed
    }

    // Recency and expiration order are unrelated, so the whole ring is scanned.
    fn sweep_expired(&mut self, now: Timestamp) -> usize {
        let expired: Vec<Handle> = self
            .ring
            .iter_lru()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(handle, _)| handle)
            .collect();

        for &handle in &expired {
            if let Some(entry) = self.remove_handle(handle) {
                trace!(key = ?entry.key, expires_at = entry.expires_at, "expired entry removed");
            }
        }

        self.stats.record_expirations(expired.len());
        expired.len()
    }

    // == Evict Lowest Priority ==
    // Walks from the LRU end and only replaces the candidate on a strictly
    // lower priority, so the first minimum found is the least recently used.
    fn evict_lowest_priority(&mut self) -> Option<K> {
        let mut victim: Option<(Handle, &P)> = None;
        for (handle, entry) in self.ring.iter_lru() {
            match victim {
                Some((_, lowest)) if entry.priority >= *lowest => {}
                _ => victim = Some((handle, &entry.priority)),
            }
        }
        let (handle, _) = victim?;

        let entry = self.remove_handle(handle)?;
        self.stats.record_eviction();
        trace!(key = ?entry.key, "evicted lowest priority entry");
        Some(entry.key)
    }
}
