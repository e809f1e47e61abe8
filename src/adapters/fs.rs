//! Filesystem Blob Store
//!
//! Implements the `BlobStore` port with one file per blob under
//! `<root>/<tenant>/<plugin>/<hex(key)>`. Keys are hex-encoded so arbitrary
//! key bytes cannot escape the directory; tenant and plugin identifiers are
//! expected to be path-safe.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{BlobStore, PluginId, TenantId};
use crate::error::{Error, Result};

/// Filesystem-backed blob store.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at the given directory. The directory is
    /// created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> PathBuf {
        self.root
            .join(tenant_id.as_str())
            .join(plugin_id.as_str())
            .join(hex::encode(key))
    }

    fn not_found(tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> Error {
        Error::BlobNotFound {
            tenant_id: tenant_id.to_string(),
            plugin_id: plugin_id.to_string(),
            key: key.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn save(
        &self,
        tenant_id: &TenantId,
        plugin_id: &PluginId,
        key: &str,
        data: &[u8],
    ) -> Result<()> {
        let path = self.blob_path(tenant_id, plugin_id, key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::StorageWrite(e.to_string()))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| Error::StorageWrite(e.to_string()))?;
        debug!(path = %path.display(), bytes = data.len(), "blob written");
        Ok(())
    }

    async fn load(&self, tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(tenant_id, plugin_id, key);
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Self::not_found(tenant_id, plugin_id, key)
            } else {
                Error::StorageRead(e.to_string())
            }
        })
    }

    async fn delete(&self, tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> Result<()> {
        let path = self.blob_path(tenant_id, plugin_id, key);
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| Error::StorageDelete(e.to_string()))
    }

    async fn size_of(&self, tenant_id: &TenantId, plugin_id: &PluginId, key: &str) -> Result<u64> {
        let path = self.blob_path(tenant_id, plugin_id, key);
        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Self::not_found(tenant_id, plugin_id, key)
            } else {
                Error::StorageRead(e.to_string())
            }
        })?;
        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn store() -> (TempDir, FsBlobStore) {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let (_dir, store) = store();
        let tenant = TenantId::new("t1");
        let plugin = PluginId::new("p1");

        store
            .save(&tenant, &plugin, "config", b"payload bytes")
            .await
            .unwrap();

        assert_eq!(
            store.load(&tenant, &plugin, "config").await.unwrap(),
            b"payload bytes"
        );
        assert_eq!(store.size_of(&tenant, &plugin, "config").await.unwrap(), 13);
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let (_dir, store) = store();
        let result = store
            .load(&TenantId::new("t"), &PluginId::new("p"), "absent")
            .await;
        assert_matches!(result, Err(Error::BlobNotFound { .. }));
    }

    #[tokio::test]
    async fn test_size_of_missing_is_not_found() {
        let (_dir, store) = store();
        let result = store
            .size_of(&TenantId::new("t"), &PluginId::new("p"), "absent")
            .await;
        assert_matches!(result, Err(Error::BlobNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let (_dir, store) = store();
        let tenant = TenantId::new("t");
        let plugin = PluginId::new("p");

        store.save(&tenant, &plugin, "k", b"x").await.unwrap();
        store.delete(&tenant, &plugin, "k").await.unwrap();
        assert_matches!(
            store.load(&tenant, &plugin, "k").await,
            Err(Error::BlobNotFound { .. })
        );
    }

    #[tokio::test]
    async fn test_key_with_path_characters_stays_inside_root() {
        let (dir, store) = store();
        let tenant = TenantId::new("t");
        let plugin = PluginId::new("p");

        store
            .save(&tenant, &plugin, "../../escape", b"contained")
            .await
            .unwrap();

        // The hex-encoded filename keeps the blob under the plugin dir.
        assert_eq!(
            store.load(&tenant, &plugin, "../../escape").await.unwrap(),
            b"contained"
        );
        let plugin_dir = dir.path().join("t").join("p");
        assert!(plugin_dir.join(hex::encode("../../escape")).exists());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let (_dir, store) = store();
        let tenant = TenantId::new("t");
        let plugin = PluginId::new("p");

        store.save(&tenant, &plugin, "k", b"first").await.unwrap();
        store.save(&tenant, &plugin, "k", b"second!").await.unwrap();

        assert_eq!(store.load(&tenant, &plugin, "k").await.unwrap(), b"second!");
        assert_eq!(store.size_of(&tenant, &plugin, "k").await.unwrap(), 8);
    }
}
