//! Error types for the persistence coordinator

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the persistence coordinator
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Request Rejections
    // =========================================================================
    /// Key exceeds the maximum allowed length
    #[error("key length {length} exceeds maximum of {max} bytes")]
    InvalidKey { length: usize, max: usize },

    /// Quota admission refused the write
    #[error(
        "quota exceeded for tenant {tenant_id} plugin {plugin_id}: \
         {used} + {requested} bytes would exceed limit of {limit}"
    )]
    QuotaExceeded {
        tenant_id: String,
        plugin_id: String,
        used: u64,
        requested: u64,
        limit: u64,
    },

    // =========================================================================
    // Blob Store Errors
    // =========================================================================
    /// Blob write failed
    #[error("blob store write failed: {0}")]
    StorageWrite(String),

    /// Blob read failed
    #[error("blob store read failed: {0}")]
    StorageRead(String),

    /// Blob delete failed
    #[error("blob store delete failed: {0}")]
    StorageDelete(String),

    /// Blob does not exist
    #[error("blob not found for tenant {tenant_id} plugin {plugin_id} key {key}")]
    BlobNotFound {
        tenant_id: String,
        plugin_id: String,
        key: String,
    },

    // =========================================================================
    // Cache Errors
    // =========================================================================
    /// Cache operation failed (a miss is not an error)
    #[error("cache error: {0}")]
    Cache(String),

    /// Cached value could not be decoded back to bytes
    #[error("failed to decode cached value: {0}")]
    Decode(#[from] hex::FromHexError),

    // =========================================================================
    // Usage Ledger Errors
    // =========================================================================
    /// Usage ledger operation failed
    #[error("usage ledger error: {0}")]
    Ledger(String),

    /// Usage row already exists for this (tenant, plugin) pair
    #[error("usage row already exists for tenant {tenant_id} plugin {plugin_id}")]
    LedgerConflict {
        tenant_id: String,
        plugin_id: String,
    },

    // =========================================================================
    // Infrastructure
    // =========================================================================
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors that reject the request itself rather than report an
    /// infrastructure failure. Rejections are not worth retrying unchanged.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::InvalidKey { .. } | Error::QuotaExceeded { .. })
    }

    /// True when the error reports a missing blob.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::BlobNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        let invalid = Error::InvalidKey {
            length: 300,
            max: 256,
        };
        let quota = Error::QuotaExceeded {
            tenant_id: "t".into(),
            plugin_id: "p".into(),
            used: 900,
            requested: 200,
            limit: 1000,
        };
        let infra = Error::StorageWrite("disk full".into());

        assert!(invalid.is_rejection());
        assert!(quota.is_rejection());
        assert!(!infra.is_rejection());
    }

    #[test]
    fn test_not_found_classification() {
        let missing = Error::BlobNotFound {
            tenant_id: "t".into(),
            plugin_id: "p".into(),
            key: "k".into(),
        };
        assert!(missing.is_not_found());
        assert!(!missing.is_rejection());
        assert!(!Error::Ledger("down".into()).is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = Error::QuotaExceeded {
            tenant_id: "T1".into(),
            plugin_id: "P1".into(),
            used: 100,
            requested: 950,
            limit: 1000,
        };
        let msg = err.to_string();
        assert!(msg.contains("T1"));
        assert!(msg.contains("950"));
        assert!(msg.contains("1000"));
    }
}
