//! Domain Ports (DDD Port/Adapter Pattern)
//!
//! This module defines the abstractions (ports) the coordinator depends on.
//! Infrastructure adapters implement these traits to provide concrete
//! implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  PersistenceCoordinator                      │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                  Ports (Traits)                      │    │
//! │  │   BlobStore  │  CacheLayer  │  UsageLedger           │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Infrastructure Layer                       │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                  Adapters (Impls)                    │    │
//! │  │  FsBlobStore │ InMemoryTtlCache │ InMemoryUsageLedger │   │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// Value Objects
// =============================================================================

/// Tenant identifier (value object). Top-level isolation boundary for
/// storage accounting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Plugin identifier (value object), scoped within a tenant. All keys saved
/// under the same (tenant, plugin) pair share one usage counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginId(pub String);

impl PluginId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PluginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PluginId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PluginId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One usage-ledger row: current total bytes allocated by a (tenant, plugin)
/// pair.
///
/// Invariant: `size_bytes` never represents bytes that are not present in the
/// blob store outside the eventual-consistency window of an in-flight
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub tenant_id: TenantId,
    pub plugin_id: PluginId,
    /// Current total bytes allocated by this tenant/plugin.
    pub size_bytes: u64,
    /// Last time the counter was mutated.
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UsageRecord {
    /// Create a new usage record stamped with the current time.
    pub fn new(tenant_id: TenantId, plugin_id: PluginId, size_bytes: u64) -> Self {
        Self {
            tenant_id,
            plugin_id,
            size_bytes,
            updated_at: chrono::Utc::now(),
        }
    }
}

// =============================================================================
// Blob Store Port
// =============================================================================

/// Port for durable blob storage, keyed by (tenant, plugin, key).
///
/// The store owns the authoritative payload. Implementations must provide
/// per-key consistency; the coordinator adds no locking of its own.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Durably write a blob, replacing any previous value under the key.
    async fn save(
        &self,
        tenant_id: &TenantId,
        plugin_id: &PluginId,
        key: &str,
        data: &[u8],
    ) -> Result<()>;

    /// Read a blob. Returns `Error::BlobNotFound` if the key has no value.
    async fn load(&self, tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> Result<Vec<u8>>;

    /// Delete a blob. Deleting a missing key is an implementation-defined
    /// error; callers check existence via [`BlobStore::size_of`] first.
    async fn delete(&self, tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> Result<()>;

    /// Size in bytes of an existing blob. Returns `Error::BlobNotFound` if
    /// the key has no value.
    async fn size_of(&self, tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> Result<u64>;
}

// =============================================================================
// Cache Layer Port
// =============================================================================

/// Port for the ephemeral TTL cache.
///
/// The cache owns nothing durable; it is a disposable projection of blob
/// store contents and may evict any entry at any time. A miss is signalled
/// with `Ok(None)`, never an error.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Look up a cached string value. `Ok(None)` means miss.
    async fn get_string(&self, cache_key: &str) -> Result<Option<String>>;

    /// Store a string value with a per-entry TTL.
    async fn set_string(&self, cache_key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Remove a cached entry. Removing an absent entry succeeds.
    async fn delete(&self, cache_key: &str) -> Result<()>;
}

// =============================================================================
// Usage Ledger Port
// =============================================================================

/// Port for the durable byte-usage ledger, one row per (tenant, plugin).
///
/// `create` must enforce uniqueness on (tenant, plugin) and fail with
/// `Error::LedgerConflict` when a row already exists, so concurrent first
/// writers can fall back to `increment`. `increment` and `decrement` must be
/// atomic once the row exists; `decrement` must not take the counter below
/// zero.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Point lookup of the usage row. `Ok(None)` if no row exists yet.
    async fn get(&self, tenant_id: &TenantId, plugin_id: &PluginId)
        -> Result<Option<UsageRecord>>;

    /// Create a new usage row. Fails with `Error::LedgerConflict` if a row
    /// for this (tenant, plugin) already exists.
    async fn create(&self, record: UsageRecord) -> Result<()>;

    /// Atomically add `delta` bytes to an existing row.
    async fn increment(&self, tenant_id: &TenantId, plugin_id: &PluginId, delta: u64)
        -> Result<()>;

    /// Atomically subtract `delta` bytes from an existing row, saturating
    /// at zero.
    async fn decrement(&self, tenant_id: &TenantId, plugin_id: &PluginId, delta: u64)
        -> Result<()>;
}

// =============================================================================
// Tests
// =============================================================================
