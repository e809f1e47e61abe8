//! Infrastructure adapters implementing the domain ports.
//!
//! - [`memory`] - In-memory blob store and usage ledger (tests, embedding)
//! - [`ttl_cache`] - In-memory TTL cache
//! - [`fs`] - Filesystem-backed blob store

pub mod fs;
pub mod memory;
pub mod ttl_cache;

pub use fs::FsBlobStore;
pub use memory::{InMemoryBlobStore, InMemoryUsageLedger};
pub use ttl_cache::InMemoryTtlCache;
