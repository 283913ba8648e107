//! Cache Statistics Module
//!
//! Tracks cache performance metrics including accesses, hits, misses, and evictions.

use serde::{Deserialize, Serialize};

// == Cache Stats ==
/// Cumulative cache counters. Persisted with snapshots, reset only by `clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of `get` calls, whatever their outcome
    pub total_accesses: u64,
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted by capacity or memory pressure
    #[serde(default)]
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    #[serde(default)]
    pub expirations: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Hit percentage rounded to two decimals, 0 when nothing was accessed.
    pub fn hit_rate(&self) -> f64 {
        percentage(self.hits, self.total_accesses)
    }

    // == Miss Rate ==
    /// Miss percentage rounded to two decimals, 0 when nothing was accessed.
    pub fn miss_rate(&self) -> f64 {
        percentage(self.misses, self.total_accesses)
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.total_accesses += 1;
        self.hits += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.total_accesses += 1;
        self.misses += 1;
    }

    // == Record Eviction ==
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    // == Record Expiration ==
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    // == Reset ==
    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = part as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

// == Key Stats ==
/// Per-key introspection data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyStats {
    pub key: String,
    pub access_count: u64,
    pub last_accessed_at: u64,
    pub estimated_size: usize,
}

// == Stats Snapshot ==
/// Read-only view of the cache statistics at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Live entry count at call time
    pub size: usize,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub total_accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// Sum of estimated entry sizes in bytes
    pub memory_usage: usize,
    /// Per-key breakdown ordered by key
    pub entries: Vec<KeyStats>,
}
