//! Recency Ring Module
//!
//! Doubly linked recency ordering stored in an arena of slots.
//!
//! Slots are addressed by integer [`Handle`]s and link to each other by
//! handle. Slots 0 and 1 are the `HEAD` and `TAIL` sentinels: they never hold
//! an entry and are never freed. Live entries sit between them:
//!
//! ```text
//!   HEAD <-> [most recent] <-> ... <-> [least recent] <-> TAIL
//! ```
//!
//! Freed slots go on a free list and are reused by later inserts.

use crate::cache::entry::CacheEntry;
use crate::error::{CacheError, Result};

// == Handle ==
/// Stable index of a slot in the ring's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Handle(usize);

const HEAD: Handle = Handle(0);
const TAIL: Handle = Handle(1);

#[derive(Debug)]
struct Slot<K, V, P> {
    prev: Handle,
    next: Handle,
    entry: Option<CacheEntry<K, V, P>>,
}

// == Recency Ring ==
/// Arena-backed doubly linked list ordering entries by recency.
///
/// - Front (next to `HEAD`) = Most recently used
/// - Back (next to `TAIL`) = Least recently used
#[derive(Debug)]
pub(crate) struct RecencyRing<K, V, P> {
    slots: Vec<Slot<K, V, P>>,
    free: Vec<Handle>,
    len: usize,
}

impl<K, V, P> RecencyRing<K, V, P> {
    // == Constructor ==
    /// Creates an empty ring with room for `capacity` entries.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity.saturating_add(2));
        slots.push(Slot {
            prev: TAIL,
            next: TAIL,
            entry: None,
        });
        slots.push(Slot {
            prev: HEAD,
            next: HEAD,
            entry: None,
        });
        Self {
            slots,
            free: Vec::new(),
            len: 0,
        }
    }

    /// Returns the number of linked entries.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    // == Push Front ==
    /// Stores `entry` in a free slot and links it as most recently used.
    pub(crate) fn push_front(&mut self, entry: CacheEntry<K, V, P>) -> Handle {
        let handle = match self.free.pop() {
            Some(handle) => {
                self.slots[handle.0].entry = Some(entry);
                handle
            }
            None => {
                self.slots.push(Slot {
                    prev: HEAD,
                    next: HEAD,
                    entry: Some(entry),
                });
                Handle(self.slots.len() - 1)
            }
        };
        self.link_front(handle);
        self.len += 1;
        handle
    }

    // == Remove ==
    /// Unlinks the entry at `handle` and frees its slot.
    ///
    /// Returns None for sentinels and already freed slots.
    pub(crate) fn remove(&mut self, handle: Handle) -> Option<CacheEntry<K, V, P>> {
        let entry = self.slots.get_mut(handle.0)?.entry.take()?;
        self.unlink(handle);
        self.free.push(handle);
        self.len -= 1;
        Some(entry)
    }

    // == Touch ==
    /// Marks an entry as most recently used.
    pub(crate) fn touch(&mut self, handle: Handle) {
        if self.is_live(handle) {
            self.unlink(handle);
            self.link_front(handle);
        }
    }

    /// Returns the entry stored at `handle`.
    pub(crate) fn get(&self, handle: Handle) -> Option<&CacheEntry<K, V, P>> {
        self.slots.get(handle.0)?.entry.as_ref()
    }

    /// Returns the entry stored at `handle` mutably.
    pub(crate) fn get_mut(&mut self, handle: Handle) -> Option<&mut CacheEntry<K, V, P>> {
        self.slots.get_mut(handle.0)?.entry.as_mut()
    }

    /// Iterates entries from most to least recently used.
    pub(crate) fn iter(&self) -> Iter<'_, K, V, P> {
        Iter {
            ring: self,
            cursor: self.slots[HEAD.0].next,
            toward_tail: true,
        }
    }

    /// Iterates entries from least to most recently used.
    pub(crate) fn iter_lru(&self) -> Iter<'_, K, V, P> {
        Iter {
            ring: self,
            cursor: self.slots[TAIL.0].prev,
            toward_tail: false,
        }
    }

    fn is_live(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.0)
            .map_or(false, |slot| slot.entry.is_some())
    }

    // == Unlink ==
    // Splices a linked slot out by joining its neighbours.
    fn unlink(&mut self, handle: Handle) {
        debug_assert!(handle != HEAD && handle != TAIL, "cannot unlink a sentinel");
        let prev = self.slots[handle.0].prev;
        let next = self.slots[handle.0].next;
        self.slots[prev.0].next = next;
        self.slots[next.0].prev = prev;
    }

    // == Link Front ==
    // Inserts a slot right after HEAD.
    fn link_front(&mut self, handle: Handle) {
        let first = self.slots[HEAD.0].next;
        self.slots[handle.0].prev = HEAD;
        self.slots[handle.0].next = first;
        self.slots[first.0].prev = handle;
        self.slots[HEAD.0].next = handle;
    }

    // == Check Links ==
    /// Walks the ring in both directions and verifies every link.
    ///
    /// Returns the handles in MRU order on success.
    pub(crate) fn check_links(&self) -> Result<Vec<Handle>> {
        let mut forward = Vec::with_capacity(self.len);
        let mut cursor = HEAD;
        loop {
            let next = self.slots[cursor.0].next;
            if self.slots[next.0].prev != cursor {
                return Err(CacheError::InvariantViolation(format!(
                    "slot {} points forward to {} which points back to {}",
                    cursor.0, next.0, self.slots[next.0].prev.0
                )));
            }
            if next == TAIL {
                break;
            }
            if next == HEAD || self.slots[next.0].entry.is_none() {
                return Err(CacheError::InvariantViolation(format!(
                    "slot {} is linked but holds no entry",
                    next.0
                )));
            }
            forward.push(next);
            if forward.len() > self.len {
                return Err(CacheError::InvariantViolation(format!(
                    "ring walk exceeded {} linked entries",
                    self.len
                )));
            }
            cursor = next;
        }
        if forward.len() != self.len {
            return Err(CacheError::InvariantViolation(format!(
                "ring links {} entries but counts {}",
                forward.len(),
                self.len
            )));
        }

        let backward: Vec<Handle> = self.iter_lru().map(|(handle, _)| handle).collect();
        if !backward.iter().rev().eq(forward.iter()) {
            return Err(CacheError::InvariantViolation(
                "backward walk is not the reverse of the forward walk".to_string(),
            ));
        }

        let occupied = self.slots.iter().filter(|slot| slot.entry.is_some()).count();
        if occupied != self.len || self.free.len() + self.len + 2 != self.slots.len() {
            return Err(CacheError::InvariantViolation(format!(
                "{} occupied slots and {} free slots do not add up to {} linked entries",
                occupied,
                self.free.len(),
                self.len
            )));
        }
        Ok(forward)
    }
}

// == Iterator ==
/// Iterator over `(Handle, &CacheEntry)` pairs in either direction.
pub(crate) struct Iter<'a, K, V, P> {
    ring: &'a RecencyRing<K, V, P>,
    cursor: Handle,
    toward_tail: bool,
}

impl<'a, K, V, P> Iterator for Iter<'a, K, V, P> {
    type Item = (Handle, &'a CacheEntry<K, V, P>);

    fn next(&mut self) -> Option<Self::Item> {
        let ring = self.ring;
        let handle = self.cursor;
        let slot = &ring.slots[handle.0];
        // Sentinels hold no entry, which ends the walk
        let entry = slot.entry.as_ref()?;
        self.cursor = if self.toward_tail { slot.next } else { slot.prev };
        Some((handle, entry))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &'static str) -> CacheEntry<&'static str, u32, u32> {
        CacheEntry::new(key, 0, u64::MAX, 0)
    }

    fn keys(ring: &RecencyRing<&'static str, u32, u32>) -> Vec<&'static str> {
        ring.iter().map(|(_, e)| e.key).collect()
    }

    #[test]
    fn test_ring_new_is_empty() {
        let ring: RecencyRing<&str, u32, u32> = RecencyRing::with_capacity(4);
        assert_eq!(ring.len(), 0);
        assert!(ring.iter().next().is_none());
        assert!(ring.iter_lru().next().is_none());
        assert!(ring.check_links().unwrap().is_empty());
    }

    #[test]
    fn test_push_front_orders_most_recent_first() {
        let mut ring = RecencyRing::with_capacity(4);
        ring.push_front(entry("a"));
        ring.push_front(entry("b"));
        ring.push_front(entry("c"));

        assert_eq!(keys(&ring), vec!["c", "b", "a"]);
        let lru: Vec<_> = ring.iter_lru().map(|(_, e)| e.key).collect();
        assert_eq!(lru, vec!["a", "b", "c"]);
        assert_eq!(ring.check_links().unwrap().len(), 3);
    }

    #[test]
    fn test_touch_moves_to_front() {
        let mut ring = RecencyRing::with_capacity(4);
        let a = ring.push_front(entry("a"));
        ring.push_front(entry("b"));
        ring.push_front(entry("c"));

        ring.touch(a);
        assert_eq!(keys(&ring), vec!["a", "c", "b"]);

        // Touching the front is a no-op on order
        ring.touch(a);
        assert_eq!(keys(&ring), vec!["a", "c", "b"]);
        ring.check_links().unwrap();
    }

    #[test]
    fn test_remove_splices_and_frees() {
        let mut ring = RecencyRing::with_capacity(4);
        ring.push_front(entry("a"));
        let b = ring.push_front(entry("b"));
        ring.push_front(entry("c"));

        let removed = ring.remove(b).unwrap();
        assert_eq!(removed.key, "b");
        assert_eq!(ring.len(), 2);
        assert_eq!(keys(&ring), vec!["c", "a"]);
        assert!(ring.get(b).is_none());

        // Second removal of the same handle is a no-op
        assert!(ring.remove(b).is_none());
        assert_eq!(ring.len(), 2);
        ring.check_links().unwrap();
    }

    #[test]
    fn test_freed_slot_is_reused() {
        let mut ring = RecencyRing::with_capacity(2);
        let a = ring.push_front(entry("a"));
        ring.remove(a);
        let b = ring.push_front(entry("b"));

        assert_eq!(a, b);
        assert_eq!(ring.get(b).map(|e| e.key), Some("b"));
        ring.check_links().unwrap();
    }

    #[test]
    fn test_sentinels_cannot_be_removed_or_touched() {
        let mut ring = RecencyRing::with_capacity(2);
        ring.push_front(entry("a"));

        assert!(ring.remove(HEAD).is_none());
        assert!(ring.remove(TAIL).is_none());
        ring.touch(HEAD);
        ring.touch(Handle(99));
        assert_eq!(keys(&ring), vec!["a"]);
        ring.check_links().unwrap();
    }

    #[test]
    fn test_remove_last_entry_relinks_sentinels() {
        let mut ring = RecencyRing::with_capacity(1);
        let a = ring.push_front(entry("a"));
        ring.remove(a);

        assert_eq!(ring.slots[HEAD.0].next, TAIL);
        assert_eq!(ring.slots[TAIL.0].prev, HEAD);
        ring.check_links().unwrap();
    }

    #[test]
    fn test_check_links_detects_corruption() {
        let mut ring = RecencyRing::with_capacity(2);
        let a = ring.push_front(entry("a"));
        ring.push_front(entry("b"));

        ring.slots[a.0].prev = TAIL;
        assert!(matches!(
            ring.check_links(),
            Err(CacheError::InvariantViolation(_))
        ));
    }
}
