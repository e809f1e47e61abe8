//! In-Memory TTL Cache
//!
//! Implements the `CacheLayer` port with a concurrent map and per-entry
//! expiry stamps. Expired entries are dropped lazily on lookup; there is no
//! background sweeper. Never a system of record.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::ports::CacheLayer;
use crate::error::Result;

#[derive(Debug, Clone)]
struct TtlEntry {
    value: String,
    expires_at: Instant,
}

impl TtlEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory string cache with per-entry TTL.
#[derive(Debug, Default)]
pub struct InMemoryTtlCache {
    entries: DashMap<String, TtlEntry>,
}

impl InMemoryTtlCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, including not-yet-collected expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all expired entries now.
    pub fn purge_expired(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
    }
}

#[async_trait]
impl CacheLayer for InMemoryTtlCache {
    async fn get_string(&self, cache_key: &str) -> Result<Option<String>> {
        if let Some(entry) = self.entries.get(cache_key) {
            if !entry.is_expired() {
                return Ok(Some(entry.value.clone()));
            }
        }
        // Expired entries are removed on the way out so the map does not
        // accumulate dead keys that are still being read.
        self.entries
            .remove_if(cache_key, |_, entry| entry.is_expired());
        Ok(None)
    }

    async fn set_string(&self, cache_key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries.insert(
            cache_key.to_string(),
            TtlEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, cache_key: &str) -> Result<()> {
        self.entries.remove(cache_key);
        Ok(())
    }
}
