//! Entry Store Module
//!
//! Single-owner cache engine: the key map, its statistics, and every rule
//! about expiry and eviction. Callers pass the current time explicitly; the
//! shared, locked handle lives in `asset_cache`.

use std::collections::HashMap;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::cache::eviction::{capacity_victims, memory_usage, memory_victims};
use crate::cache::{CacheEntry, CacheStats, KeyStats, PersistedSnapshot, StatsSnapshot};
use crate::config::CacheConfig;

// == Entry Store ==
/// Cache storage with TTL expiry, LRU capacity eviction and memory eviction.
#[derive(Debug)]
pub struct EntryStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// Entry count that triggers capacity eviction
    max_entries: usize,
    /// Estimated memory budget in bytes
    max_memory_bytes: usize,
    /// TTL for entries set without an explicit one
    default_ttl: Duration,
    /// Next recency tick handed out on insert or hit
    next_seq: u64,
}

impl<V: Clone + Serialize> EntryStore<V> {
    // == Constructor ==
    /// Creates an empty store bounded by `config`.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_entries: config.max_entries,
            max_memory_bytes: config.max_memory_bytes,
            default_ttl: config.default_ttl,
            next_seq: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired. Expired entries are
    /// removed and counted as misses.
    pub fn get(&mut self, key: &str, now: u64) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired_at(now),
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        let seq = self.tick();
        let entry = self.entries.get_mut(key)?;
        entry.record_hit(now, seq);
        self.stats.record_hit();
        Some(entry.value.clone())
    }

    // == Has ==
    /// Returns true if the key is present and not expired.
    ///
    /// Expired entries are removed. Statistics are not affected.
    pub fn has(&mut self, key: &str, now: u64) -> bool {
        let expired = match self.entries.get(key) {
            None => return false,
            Some(entry) => entry.is_expired_at(now),
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expirations(1);
        }
        !expired
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// An existing entry for the key is replaced by a fresh one. Capacity
    /// eviction runs before the insert and memory eviction after it, with
    /// the new entry chosen last.
    pub fn set(&mut self, key: String, value: V, ttl: Option<Duration>, now: u64) {
        self.entries.remove(&key);

        let victims = capacity_victims(&self.entries, self.max_entries);
        if !victims.is_empty() {
            debug!(count = victims.len(), "Capacity eviction");
            self.evict(&victims);
        }

        let seq = self.tick();
        let entry = CacheEntry::new(&key, value, now, ttl.unwrap_or(self.default_ttl), seq);
        self.entries.insert(key.clone(), entry);

        let victims = memory_victims(&self.entries, self.max_memory_bytes, Some(key.as_str()));
        if !victims.is_empty() {
            debug!(count = victims.len(), "Memory eviction");
            self.evict(&victims);
        }
    }

    fn evict(&mut self, keys: &[String]) {
        for key in keys {
            self.entries.remove(key);
        }
        self.stats.record_evictions(keys.len());
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry and resets all statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.reset();
    }

    // == Keys ==
    /// Lists present keys in sorted order, optionally filtered by `pattern`.
    ///
    /// Expiry is not checked, so entries past their TTL that neither a read
    /// nor the sweeper has removed yet are still listed.
    pub fn keys(&self, pattern: Option<&Regex>) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.map_or(true, |re| re.is_match(key)))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    // == Batch Operations ==
    /// Reads several keys, omitting absent and expired ones.
    pub fn get_batch<K: AsRef<str>>(&mut self, keys: &[K], now: u64) -> HashMap<String, V> {
        keys.iter()
            .filter_map(|key| {
                let key = key.as_ref();
                self.get(key, now).map(|value| (key.to_string(), value))
            })
            .collect()
    }

    /// Stores several pairs sharing one TTL.
    pub fn set_batch<I>(&mut self, entries: I, ttl: Option<Duration>, now: u64)
    where
        I: IntoIterator<Item = (String, V)>,
    {
        for (key, value) in entries {
            self.set(key, value, ttl, now);
        }
    }

    // == Sweep Expired ==
    /// Removes all entries whose TTL has elapsed at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self, now: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_sweepable_at(now));
        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics with a per-key breakdown.
    pub fn stats(&self) -> StatsSnapshot {
        let mut entries: Vec<KeyStats> = self
            .entries
            .iter()
            .map(|(key, entry)| KeyStats {
                key: key.clone(),
                access_count: entry.access_count,
                last_accessed_at: entry.last_accessed_at,
                estimated_size: entry.estimated_size,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        StatsSnapshot {
            size: self.entries.len(),
            hit_rate: self.stats.hit_rate(),
            miss_rate: self.stats.miss_rate(),
            total_accesses: self.stats.total_accesses,
            hits: self.stats.hits,
            misses: self.stats.misses,
            evictions: self.stats.evictions,
            expirations: self.stats.expirations,
            memory_usage: self.memory_usage(),
            entries,
        }
    }

    /// Sum of estimated entry sizes in bytes.
    pub fn memory_usage(&self) -> usize {
        memory_usage(&self.entries)
    }

    // == Snapshot ==
    /// Copies the store into its persisted form, least recently used first.
    pub fn to_snapshot(&self, now: u64) -> PersistedSnapshot<V> {
        let mut entries: Vec<(String, CacheEntry<V>)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect();
        entries.sort_by_key(|(_, entry)| entry.recency());

        PersistedSnapshot {
            entries,
            stats: self.stats.clone(),
            saved_at: now,
        }
    }

    /// Replaces the store contents with a persisted snapshot.
    ///
    /// Sizes are recomputed and the current limits enforced, so a snapshot
    /// taken under a larger configuration is trimmed on the way in. Returns
    /// the number of entries trimmed.
    pub fn restore(&mut self, snapshot: PersistedSnapshot<V>) -> usize {
        self.entries.clear();
        self.stats = snapshot.stats;
        self.next_seq = 0;

        for (key, mut entry) in snapshot.entries {
            entry.refresh_size(&key);
            self.next_seq = self.next_seq.max(entry.access_seq + 1);
            self.entries.insert(key, entry);
        }
        let loaded = self.entries.len();

        if self.entries.len() > self.max_entries {
            let mut ranked: Vec<(String, (u64, u64))> = self
                .entries
                .iter()
                .map(|(key, entry)| (key.clone(), entry.recency()))
                .collect();
            ranked.sort_by_key(|(_, recency)| *recency);
            let surplus = self.entries.len() - self.max_entries;
            let victims: Vec<String> = ranked.into_iter().take(surplus).map(|(k, _)| k).collect();
            self.evict(&victims);
        }

        let victims = memory_victims(&self.entries, self.max_memory_bytes, None);
        self.evict(&victims);
        loaded - self.entries.len()
    }

    // == Length ==
    /// Returns the current number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
