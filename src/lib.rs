//! Priority Cache - an in-memory key-value cache
//!
//! Entries carry an absolute expiration and a priority. When a new key
//! arrives at full capacity, expired entries are purged first, then the
//! lowest-priority entry is evicted, ties going to the least recently used.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStats, Clock, ManualClock, PriorityCache, SystemClock, Timestamp};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
