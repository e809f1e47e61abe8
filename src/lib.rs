//! QuotaStore - Tenant-Scoped Key-Value Persistence Coordinator
//!
//! An in-process coordination layer that saves, loads, and deletes opaque
//! byte blobs under string keys while enforcing a storage quota per
//! (tenant, plugin) pair and keeping a cache-aside read path warm.
//!
//! # Architecture
//!
//! The coordinator sequences three collaborator ports:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  PersistenceCoordinator                      │
//! │      save: admit quota → write blob → commit ledger          │
//! │      load: cache → blob store → populate cache               │
//! │      delete: invalidate → probe size → delete → decrement    │
//! └──────────────┬───────────────┬──────────────┬───────────────┘
//!                ▼               ▼              ▼
//!          ┌──────────┐   ┌────────────┐  ┌────────────┐
//!          │ BlobStore│   │ CacheLayer │  │ UsageLedger│
//!          │ (durable)│   │ (TTL, eph.)│  │ (counters) │
//!          └──────────┘   └────────────┘  └────────────┘
//! ```
//!
//! The blob store owns the authoritative payload, the ledger owns the
//! authoritative byte accounting, and the cache owns nothing durable.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use quotastore::adapters::{InMemoryBlobStore, InMemoryTtlCache, InMemoryUsageLedger};
//! use quotastore::{CoordinatorConfig, PersistenceCoordinator, PluginId, TenantId};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> quotastore::Result<()> {
//! let coordinator = PersistenceCoordinator::new(
//!     Arc::new(InMemoryBlobStore::new()),
//!     Arc::new(InMemoryTtlCache::new()),
//!     Arc::new(InMemoryUsageLedger::new()),
//!     CoordinatorConfig::new().with_default_quota(1024),
//! );
//!
//! let tenant = TenantId::new("acme");
//! let plugin = PluginId::new("weather");
//! coordinator.save(&tenant, &plugin, -1, "last-report", b"sunny").await?;
//! assert_eq!(coordinator.load(&tenant, &plugin, "last-report").await?, b"sunny");
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`adapters`] - Infrastructure adapters implementing the domain ports
//! - [`config`] - Coordinator configuration
//! - [`coordinator`] - The root orchestrator
//! - [`domain`] - Domain layer with ports and value objects (DDD)
//! - [`error`] - Error types
//! - [`metrics`] - In-process counters

pub mod adapters;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod metrics;

// Re-export commonly used types
pub use config::CoordinatorConfig;
pub use coordinator::{PersistenceCoordinator, CACHE_KEY_PREFIX};
pub use domain::ports::{BlobStore, CacheLayer, PluginId, TenantId, UsageLedger, UsageRecord};
pub use error::{Error, Result};
pub use metrics::{CoordinatorMetrics, MetricsSnapshot};
