//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and access metadata.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::clock::duration_ms;

// == Size Estimation Constants ==
/// Bytes attributed to the timestamps and counters of every entry
pub const ENTRY_METADATA_BYTES: usize = 40;

/// Multiplier applied to the raw byte estimate to approximate allocation overhead
pub const SIZE_OVERHEAD_FACTOR: usize = 2;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), always after `created_at`
    pub expires_at: u64,
    /// Number of successful reads since creation
    pub access_count: u64,
    /// Timestamp of creation or of the latest hit (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Store-wide recency tick, breaks ties between equal `last_accessed_at`
    pub access_seq: u64,
    /// Estimated in-memory footprint, derived from key and value
    #[serde(skip)]
    pub estimated_size: usize,
}

impl<V: Serialize> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stored under `key`, born at `now`.
    ///
    /// A zero TTL is clamped to one millisecond so that `expires_at > created_at`.
    pub fn new(key: &str, value: V, now: u64, ttl: Duration, access_seq: u64) -> Self {
        let ttl_ms = duration_ms(ttl).max(1);
        let estimated_size = estimate_size(key, &value);

        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
            access_count: 0,
            last_accessed_at: now,
            access_seq,
            estimated_size,
        }
    }

    // == Refresh Size ==
    /// Recomputes `estimated_size`, used after deserialization.
    pub fn refresh_size(&mut self, key: &str) {
        self.estimated_size = estimate_size(key, &self.value);
    }
}

impl<V> CacheEntry<V> {
    // == Is Expired ==
    /// Checks expiry as seen by reads: expired once `now` is past `expires_at`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }

    // == Is Sweepable ==
    /// Checks expiry as seen by the sweeper, which also takes entries
    /// expiring exactly at `now`.
    pub fn is_sweepable_at(&self, now: u64) -> bool {
        self.expires_at <= now
    }

    // == Record Hit ==
    /// Updates access metadata after a successful read.
    pub fn record_hit(&mut self, now: u64, access_seq: u64) {
        self.access_count += 1;
        self.last_accessed_at = now;
        self.access_seq = access_seq;
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }

    /// Ranking key for least-recently-used ordering.
    pub fn recency(&self) -> (u64, u64) {
        (self.last_accessed_at, self.access_seq)
    }
}

// == Utility Functions ==
/// Estimates the footprint of an entry from its key and JSON-encoded value.
///
/// Values that cannot be serialized contribute no payload bytes.
pub fn estimate_size<V: Serialize>(key: &str, value: &V) -> usize {
    let payload = serde_json::to_vec(value).map(|b| b.len()).unwrap_or(0);
    (key.len() + payload + ENTRY_METADATA_BYTES) * SIZE_OVERHEAD_FACTOR
}
