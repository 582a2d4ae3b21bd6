//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;

use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Default TTL in seconds for inserts that don't supply one
    pub default_ttl: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    ///
    /// Unparsable values fall back to the defaults. A parsed capacity of 0 is
    /// kept so that [`CacheConfig::validate`] can reject it.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl),
        }
    }

    // == Validate ==
    /// Checks that the configuration can back a working cache.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            default_ttl: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.default_ttl, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the env vars so parallel tests can't race on them
        env::remove_var("CACHE_CAPACITY");
        env::remove_var("CACHE_DEFAULT_TTL");
        assert_eq!(CacheConfig::from_env(), CacheConfig::default());

        env::set_var("CACHE_CAPACITY", "64");
        env::set_var("CACHE_DEFAULT_TTL", "not-a-number");
        let config = CacheConfig::from_env();
        assert_eq!(config.capacity, 64);
        assert_eq!(config.default_ttl, 300);

        env::set_var("CACHE_CAPACITY", "0");
        assert!(CacheConfig::from_env().validate().is_err());

        env::remove_var("CACHE_CAPACITY");
        env::remove_var("CACHE_DEFAULT_TTL");
    }

    #[test]
    fn test_config_zero_capacity_rejected() {
        let config = CacheConfig {
            capacity: 0,
            default_ttl: 300,
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }
}
