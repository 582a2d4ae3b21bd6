//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, priority eviction and
//! LRU tie-breaking.

mod clock;
mod entry;
mod eviction;
mod ring;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::PriorityCache;
