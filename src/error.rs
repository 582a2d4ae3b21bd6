//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Missing keys are not
//! errors; lookups report them as `None`.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Rejected configuration, e.g. a zero capacity
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal ring/index state is inconsistent
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::InvalidConfig("capacity must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: capacity must be at least 1"
        );

        let err = CacheError::InvariantViolation("index has 2 keys, ring has 1".to_string());
        assert!(err.to_string().starts_with("Invariant violated"));
    }
}
