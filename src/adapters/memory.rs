//! In-Memory Adapters
//!
//! Reference implementations of the `BlobStore` and `UsageLedger` ports
//! backed by concurrent maps. Used by the test suite and by embedders that
//! want the coordinator without external infrastructure.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::ports::{BlobStore, PluginId, TenantId, UsageLedger, UsageRecord};
use crate::error::{Error, Result};

/// Composite key for one blob: (tenant, plugin, key).
type BlobKey = (String, String, String);

fn blob_key(tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> BlobKey {
    (
        tenant_id.as_str().to_string(),
        plugin_id.as_str().to_string(),
        key.to_string(),
    )
}

/// In-memory blob store.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: DashMap<BlobKey, Bytes>,
}

impl InMemoryBlobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs held.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// True when no blobs are held.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn save(
        &self,
        tenant_id: &TenantId,
        plugin_id: &PluginId,
        key: &str,
        data: &[u8],
    ) -> Result<()> {
        self.blobs.insert(
            blob_key(tenant_id, plugin_id, key),
            Bytes::copy_from_slice(data),
        );
        Ok(())
    }

    async fn load(&self, tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> Result<Vec<u8>> {
        self.blobs
            .get(&blob_key(tenant_id, plugin_id, key))
            .map(|entry| entry.value().to_vec())
            .ok_or_else(|| Error::BlobNotFound {
                tenant_id: tenant_id.to_string(),
                plugin_id: plugin_id.to_string(),
                key: key.to_string(),
            })
    }

    async fn delete(&self, tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> Result<()> {
        match self.blobs.remove(&blob_key(tenant_id, plugin_id, key)) {
            Some(_) => Ok(()),
            None => Err(Error::StorageDelete(format!(
                "no blob for tenant {} plugin {} key {}",
                tenant_id, plugin_id, key
            ))),
        }
    }

    async fn size_of(&self, tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> Result<u64> {
        self.blobs
            .get(&blob_key(tenant_id, plugin_id, key))
            .map(|entry| entry.value().len() as u64)
            .ok_or_else(|| Error::BlobNotFound {
                tenant_id: tenant_id.to_string(),
                plugin_id: plugin_id.to_string(),
                key: key.to_string(),
            })
    }
}

/// In-memory usage ledger with a unique constraint on (tenant, plugin).
///
/// `create` is an atomic insert-if-absent via the map's entry API, so
/// concurrent first writers cannot double-create a row. Increment and
/// decrement mutate under the entry's shard lock; decrement saturates at
/// zero.
#[derive(Debug, Default)]
pub struct InMemoryUsageLedger {
    rows: DashMap<(String, String), UsageRecord>,
}

impl InMemoryUsageLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn row_key(tenant_id: &TenantId, plugin_id: &PluginId) -> (String, String) {
        (
            tenant_id.as_str().to_string(),
            plugin_id.as_str().to_string(),
        )
    }
}

#[async_trait]
impl UsageLedger for InMemoryUsageLedger {
    async fn get(
        &self,
        tenant_id: &TenantId,
        plugin_id: &PluginId,
    ) -> Result<Option<UsageRecord>> {
        Ok(self
            .rows
            .get(&Self::row_key(tenant_id, plugin_id))
            .map(|entry| entry.value().clone()))
    }

    async fn create(&self, record: UsageRecord) -> Result<()> {
        let key = Self::row_key(&record.tenant_id, &record.plugin_id);
        match self.rows.entry(key) {
            Entry::Occupied(_) => Err(Error::LedgerConflict {
                tenant_id: record.tenant_id.to_string(),
                plugin_id: record.plugin_id.to_string(),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(record);
                Ok(())
            }
        }
    }

    async fn increment(
        &self,
        tenant_id: &TenantId,
        plugin_id: &PluginId,
        delta: u64,
    ) -> Result<()> {
        let mut row = self
            .rows
            .get_mut(&Self::row_key(tenant_id, plugin_id))
            .ok_or_else(|| {
                Error::Ledger(format!(
                    "no usage row for tenant {} plugin {}",
                    tenant_id, plugin_id
                ))
            })?;
        row.size_bytes += delta;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn decrement(
        &self,
        tenant_id: &TenantId,
        plugin_id: &PluginId,
        delta: u64,
    ) -> Result<()> {
        let mut row = self
            .rows
            .get_mut(&Self::row_key(tenant_id, plugin_id))
            .ok_or_else(|| {
                Error::Ledger(format!(
                    "no usage row for tenant {} plugin {}",
                    tenant_id, plugin_id
                ))
            })?;
        row.size_bytes = row.size_bytes.saturating_sub(delta);
        row.updated_at = Utc::now();
        Ok(())
    }
}
