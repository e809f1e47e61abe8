//! Coordinator Metrics Collection
//!
//! Lightweight atomic counters for monitoring coordinator behavior. A
//! snapshot is serializable so embedders can export it however they like.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Coordinator metrics collector
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
    saves: AtomicU64,
    loads: AtomicU64,
    deletes: AtomicU64,

    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_populate_failures: AtomicU64,

    quota_rejections: AtomicU64,
    invalid_key_rejections: AtomicU64,
}

impl CoordinatorMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_save(&self) {
        self.saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_populate_failure(&self) {
        self.cache_populate_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_quota_rejection(&self) {
        self.quota_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_key(&self) {
        self.invalid_key_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Fraction of loads served from cache, 0.0 when no loads recorded.
    pub fn cache_hit_ratio(&self) -> f64 {
        let hits = self.cache_hits() as f64;
        let total = hits + self.cache_misses() as f64;
        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            saves: self.saves.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            cache_hits: self.cache_hits(),
            cache_misses: self.cache_misses(),
            cache_populate_failures: self.cache_populate_failures.load(Ordering::Relaxed),
            quota_rejections: self.quota_rejections.load(Ordering::Relaxed),
            invalid_key_rejections: self.invalid_key_rejections.load(Ordering::Relaxed),
            cache_hit_ratio: self.cache_hit_ratio(),
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub saves: u64,
    pub loads: u64,
    pub deletes: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_populate_failures: u64,
    pub quota_rejections: u64,
    pub invalid_key_rejections: u64,
    pub cache_hit_ratio: f64,
}
