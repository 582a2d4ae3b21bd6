//! Clock Module
//!
//! Time sources used for expiration checks. Timestamps are Unix milliseconds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

/// Absolute point in time, in Unix milliseconds.
pub type Timestamp = u64;

// == Clock Trait ==
/// A source of the current time.
///
/// The cache reads the clock at every expiration check. Callers supply
/// expirations on the same scale; if the clock moves backwards between calls,
/// entries may outlive their intended deadline.
pub trait Clock {
    /// Returns the current time.
    fn now(&self) -> Timestamp;

    /// Returns the timestamp `ttl` from now, saturating on overflow.
    fn deadline_after(&self, ttl: Duration) -> Timestamp {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self.now().saturating_add(ttl_ms)
    }
}

// == System Clock ==
/// Wall clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Pre-epoch wall clocks clamp to zero
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

// == Manual Clock ==
/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the cache.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock starting at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let by_ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(by_ms))
            });
    }

    /// Jumps to an absolute time, forwards or backwards.
    pub fn set(&self, to: Timestamp) {
        self.now.store(to, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
