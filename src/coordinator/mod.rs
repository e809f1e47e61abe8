//! Persistence Coordinator - Quota-Enforced Cache-Aside Orchestrator
//!
//! Sequences every save/load/delete across the three collaborator ports:
//!
//! ```text
//! save:   ledger lookup → quota admission → blob write → ledger commit → cache invalidate
//! load:   cache lookup → blob read → cache populate
//! delete: cache invalidate → size probe → blob delete → ledger decrement
//! ```
//!
//! Quota admission happens before the blob write, so a rejected save has no
//! observable side effect anywhere. The coordinator holds no locks; it relies
//! on the ledger's atomic increment/decrement and the blob store's per-key
//! consistency. Concurrent admits for the same (tenant, plugin) can jointly
//! overshoot the quota by at most one in-flight payload each; closing that
//! window would need a reservation primitive on the ledger port.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::CoordinatorConfig;
use crate::domain::ports::{BlobStore, CacheLayer, PluginId, TenantId, UsageLedger, UsageRecord};
use crate::error::{Error, Result};
use crate::metrics::CoordinatorMetrics;

/// Prefix of every cache key written by the coordinator. Stable across
/// implementations sharing one cache backend.
pub const CACHE_KEY_PREFIX: &str = "persistence:cache";

/// The root orchestrator over blob store, cache, and usage ledger.
pub struct PersistenceCoordinator {
    blob_store: Arc<dyn BlobStore>,
    cache: Arc<dyn CacheLayer>,
    ledger: Arc<dyn UsageLedger>,
    config: CoordinatorConfig,
    metrics: Arc<CoordinatorMetrics>,
}

impl PersistenceCoordinator {
    /// Create a new coordinator with the given collaborators and config.
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        cache: Arc<dyn CacheLayer>,
        ledger: Arc<dyn UsageLedger>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            blob_store,
            cache,
            ledger,
            config,
            metrics: Arc::new(CoordinatorMetrics::new()),
        }
    }

    /// Create a coordinator with default configuration.
    pub fn with_defaults(
        blob_store: Arc<dyn BlobStore>,
        cache: Arc<dyn CacheLayer>,
        ledger: Arc<dyn UsageLedger>,
    ) -> Self {
        Self::new(blob_store, cache, ledger, CoordinatorConfig::default())
    }

    /// Get the coordinator configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Get the metrics collector.
    pub fn metrics(&self) -> &CoordinatorMetrics {
        &self.metrics
    }

    /// Derive the cache key for a (tenant, plugin, key) triple.
    pub fn cache_key(tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> String {
        format!("{}:{}:{}:{}", CACHE_KEY_PREFIX, tenant_id, plugin_id, key)
    }

    /// Save a blob under (tenant, plugin, key), enforcing the storage quota.
    ///
    /// `max_size < 0` means "use the process-wide default quota"; a
    /// non-negative `max_size` is capped by the default quota either way.
    ///
    /// Order of operations: ledger lookup, quota admission, blob write,
    /// ledger commit, cache invalidation. A `QuotaExceeded` rejection leaves
    /// blob store, ledger, and cache untouched. If the ledger commit fails
    /// after the blob write, the error is surfaced and the blob is left in
    /// place as unaccounted bytes (logged at warn).
    ///
    /// Overwriting an existing key is accounted as a fresh allocation; the
    /// ledger tracks the sum of all saved lengths, not live bytes per key.
    pub async fn save(
        &self,
        tenant_id: &TenantId,
        plugin_id: &PluginId,
        max_size: i64,
        key: &str,
        data: &[u8],
    ) -> Result<()> {
        if key.len() > self.config.max_key_length {
            self.metrics.record_invalid_key();
            return Err(Error::InvalidKey {
                length: key.len(),
                max: self.config.max_key_length,
            });
        }

        let effective_max = if max_size < 0 {
            self.config.default_quota_bytes
        } else {
            max_size as u64
        };

        let allocated = data.len() as u64;
        let existing = self.ledger.get(tenant_id, plugin_id).await?;
        let used = existing.as_ref().map(|r| r.size_bytes).unwrap_or(0);

        // Admission: the new total must stay within both the per-request
        // limit and the process-wide default quota. An addition that would
        // overflow u64 is over any representable limit.
        let limit = effective_max.min(self.config.default_quota_bytes);
        if used.checked_add(allocated).map_or(true, |total| total > limit) {
            self.metrics.record_quota_rejection();
            return Err(Error::QuotaExceeded {
                tenant_id: tenant_id.to_string(),
                plugin_id: plugin_id.to_string(),
                used,
                requested: allocated,
                limit,
            });
        }

        self.blob_store
            .save(tenant_id, plugin_id, key, data)
            .await?;

        if let Err(e) = self
            .commit_allocation(tenant_id, plugin_id, allocated, existing.is_some())
            .await
        {
            warn!(
                tenant_id = %tenant_id,
                plugin_id = %plugin_id,
                key = %key,
                bytes = allocated,
                "ledger commit failed after blob write; bytes are unaccounted: {}",
                e
            );
            return Err(e);
        }

        // The write is now authoritative in the blob store; any cached prior
        // value must not be served.
        self.cache
            .delete(&Self::cache_key(tenant_id, plugin_id, key))
            .await?;

        self.metrics.record_save();
        debug!(
            tenant_id = %tenant_id,
            plugin_id = %plugin_id,
            key = %key,
            bytes = allocated,
            "blob saved"
        );
        Ok(())
    }

    /// Commit an admitted allocation to the ledger: increment the existing
    /// row, or create it on first write. A create that loses a concurrent
    /// first-writer race falls back to increment, so both writers land their
    /// bytes exactly once.
    async fn commit_allocation(
        &self,
        tenant_id: &TenantId,
        plugin_id: &PluginId,
        allocated: u64,
        row_exists: bool,
    ) -> Result<()> {
        if row_exists {
            return self.ledger.increment(tenant_id, plugin_id, allocated).await;
        }

        let record = UsageRecord::new(tenant_id.clone(), plugin_id.clone(), allocated);
        match self.ledger.create(record).await {
            Err(Error::LedgerConflict { .. }) => {
                self.ledger.increment(tenant_id, plugin_id, allocated).await
            }
            other => other,
        }
    }

    /// Load a blob, serving from cache when possible and populating the
    /// cache on miss.
    ///
    /// A corrupt cached value is a hard `Decode` error, not a miss. A failure
    /// to populate the cache after a successful read is logged and swallowed:
    /// the cache is a disposable projection and must not fail a durable read.
    pub async fn load(
        &self,
        tenant_id: &TenantId,
        plugin_id: &PluginId,
        key: &str,
    ) -> Result<Vec<u8>> {
        let cache_key = Self::cache_key(tenant_id, plugin_id, key);

        if let Some(encoded) = self.cache.get_string(&cache_key).await? {
            self.metrics.record_cache_hit();
            self.metrics.record_load();
            debug!(tenant_id = %tenant_id, plugin_id = %plugin_id, key = %key, "cache hit");
            return Ok(hex::decode(encoded)?);
        }
        self.metrics.record_cache_miss();

        let data = self.blob_store.load(tenant_id, plugin_id, key).await?;

        if let Err(e) = self
            .cache
            .set_string(&cache_key, &hex::encode(&data), self.config.cache_ttl)
            .await
        {
            self.metrics.record_cache_populate_failure();
            warn!(cache_key = %cache_key, "failed to populate cache: {}", e);
        }

        self.metrics.record_load();
        Ok(data)
    }

    /// Delete a blob and release its bytes from the usage ledger.
    ///
    /// Deleting a key with no blob is idempotent success with no ledger
    /// change. Every other partial failure (size probe, blob delete, ledger
    /// decrement) is surfaced; in particular a blob that is gone while the
    /// ledger was not decremented is reported, never swallowed.
    pub async fn delete(
        &self,
        tenant_id: &TenantId,
        plugin_id: &PluginId,
        key: &str,
    ) -> Result<()> {
        self.cache
            .delete(&Self::cache_key(tenant_id, plugin_id, key))
            .await?;

        // Pre-delete size probe; the ledger is decremented by what the blob
        // actually held.
        let size = match self.blob_store.size_of(tenant_id, plugin_id, key).await {
            Ok(size) => size,
            Err(e) if e.is_not_found() => {
                debug!(
                    tenant_id = %tenant_id,
                    plugin_id = %plugin_id,
                    key = %key,
                    "delete of missing blob is a no-op"
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.blob_store.delete(tenant_id, plugin_id, key).await?;
        self.ledger.decrement(tenant_id, plugin_id, size).await?;

        self.metrics.record_delete();
        debug!(
            tenant_id = %tenant_id,
            plugin_id = %plugin_id,
            key = %key,
            bytes = size,
            "blob deleted"
        );
        Ok(())
    }

    /// Current usage row for a (tenant, plugin) pair, if any.
    pub async fn usage(
        &self,
        tenant_id: &TenantId,
        plugin_id: &PluginId,
    ) -> Result<Option<UsageRecord>> {
        self.ledger.get(tenant_id, plugin_id).await
    }
}
