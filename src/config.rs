//! Coordinator configuration

use std::time::Duration;

/// Maximum key length accepted by the coordinator, in bytes.
pub const DEFAULT_MAX_KEY_LENGTH: usize = 256;

/// Default per-(tenant, plugin) storage quota: 100 MiB.
pub const DEFAULT_QUOTA_BYTES: u64 = 100 * 1024 * 1024;

/// TTL applied to cache entries populated on read.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Configuration for the persistence coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Process-wide default quota in bytes, applied when a caller passes no
    /// per-request limit and as the hard upper bound on any per-request limit.
    pub default_quota_bytes: u64,
    /// TTL for cache entries populated on read.
    pub cache_ttl: Duration,
    /// Maximum accepted key length in bytes.
    pub max_key_length: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_quota_bytes: DEFAULT_QUOTA_BYTES,
            cache_ttl: DEFAULT_CACHE_TTL,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
        }
    }
}

impl CoordinatorConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the process-wide default quota.
    pub fn with_default_quota(mut self, bytes: u64) -> Self {
        self.default_quota_bytes = bytes;
        self
    }

    /// Set the cache entry TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the maximum accepted key length.
    pub fn with_max_key_length(mut self, max: usize) -> Self {
        self.max_key_length = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.default_quota_bytes, DEFAULT_QUOTA_BYTES);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.max_key_length, 256);
    }

    #[test]
    fn test_config_builder() {
        let config = CoordinatorConfig::new()
            .with_default_quota(1000)
            .with_cache_ttl(Duration::from_secs(60))
            .with_max_key_length(128);

        assert_eq!(config.default_quota_bytes, 1000);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.max_key_length, 128);
    }
}
