//! Domain layer: value objects and collaborator ports.

pub mod ports;

pub use ports::{BlobStore, CacheLayer, PluginId, TenantId, UsageLedger, UsageRecord};
