//! Asset Cache Module
//!
//! Shared handle around an `EntryStore`. All operations, including the
//! background sweep, go through one mutex per instance. Mutations queue a
//! best-effort snapshot when persistence is enabled; encoding and storage I/O
//! happen on the snapshot writer thread, outside the mutex.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::persistence::{SnapshotAdapter, SnapshotStorage};
use crate::cache::writer::SnapshotWriter;
use crate::cache::{EntryStore, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::Result;

/// Values the cache can hold.
pub trait CacheValue: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

// == Asset Cache ==
/// Cloneable handle to one cache instance. Clones share the same entries.
///
/// A snapshot is queued after `set`, `set_batch`, a `delete` that removed
/// something, a sweep that removed something, and a read that dropped an
/// expired entry. Counters changed by other reads reach storage with the
/// next snapshot, so reads alone since the last one are lost on a crash.
#[derive(Debug)]
pub struct AssetCache<V> {
    inner: Arc<Shared<V>>,
}

#[derive(Debug)]
struct Shared<V> {
    store: Mutex<EntryStore<V>>,
    config: CacheConfig,
    persistence: Option<SnapshotWriter<V>>,
    clock: Arc<dyn Clock>,
}

impl<V> Clone for AssetCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: CacheValue> AssetCache<V> {
    // == Constructors ==
    /// Creates an in-memory cache on the system clock.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, None, Arc::new(SystemClock))
    }

    /// Creates a cache snapshotted to `storage` on the system clock.
    pub fn with_storage(config: CacheConfig, storage: Arc<dyn SnapshotStorage>) -> Result<Self> {
        Self::with_clock(config, Some(storage), Arc::new(SystemClock))
    }

    /// Creates a cache with an explicit storage backend and time source.
    ///
    /// Fails on invalid configuration or when the snapshot writer thread
    /// cannot be started. With persistence enabled and a backend supplied, a
    /// usable snapshot is restored and swept before the cache is returned.
    pub fn with_clock(
        config: CacheConfig,
        storage: Option<Arc<dyn SnapshotStorage>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let mut store = EntryStore::new(&config);
        let persistence = match storage {
            Some(storage) if config.persistence_enabled => {
                let adapter = SnapshotAdapter::new(
                    storage,
                    config.snapshot_max_age,
                    config.compression_enabled,
                );
                let now = clock.now_ms();
                let changed = restore(&mut store, &adapter, now);
                let writer = SnapshotWriter::spawn(adapter)?;
                if changed {
                    writer.save(store.to_snapshot(now));
                }
                Some(writer)
            }
            Some(_) => {
                debug!("Persistence disabled, ignoring storage backend");
                None
            }
            None => None,
        };

        Ok(Self {
            inner: Arc::new(Shared {
                store: Mutex::new(store),
                config,
                persistence,
                clock,
            }),
        })
    }

    fn now(&self) -> u64 {
        self.inner.clock.now_ms()
    }

    /// Queues a snapshot of `store`. Only the in-memory copy is made here.
    fn persist(&self, store: &EntryStore<V>) {
        if let Some(writer) = &self.inner.persistence {
            writer.save(store.to_snapshot(self.now()));
        }
    }

    /// Blocks until every queued snapshot has been written or cleared.
    pub fn flush(&self) {
        if let Some(writer) = &self.inner.persistence {
            writer.flush();
        }
    }

    // == Get ==
    /// Returns the value for `key` if it is live, recording a hit or miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.now();
        let mut store = self.inner.store.lock();
        let before = store.len();
        let value = store.get(key, now);
        if store.len() < before {
            self.persist(&store);
        }
        value
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`, or the default TTL.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let now = self.now();
        let mut store = self.inner.store.lock();
        store.set(key.into(), value, ttl, now);
        self.persist(&store);
    }

    // == Has ==
    /// True if `key` is present and not expired.
    pub fn has(&self, key: &str) -> bool {
        let now = self.now();
        let mut store = self.inner.store.lock();
        let before = store.len();
        let present = store.has(key, now);
        if store.len() < before {
            self.persist(&store);
        }
        present
    }

    // == Delete ==
    /// Removes `key`. Returns whether anything was removed.
    pub fn delete(&self, key: &str) -> bool {
        let mut store = self.inner.store.lock();
        let removed = store.delete(key);
        if removed {
            self.persist(&store);
        }
        removed
    }

    // == Clear ==
    /// Empties the cache, resets statistics and drops the stored snapshot.
    pub fn clear(&self) {
        let mut store = self.inner.store.lock();
        store.clear();
        if let Some(writer) = &self.inner.persistence {
            writer.clear();
        }
        info!("Cache cleared");
    }

    // == Stats ==
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.store.lock().stats()
    }

    // == Batch Operations ==
    /// Reads several keys, omitting absent and expired ones.
    pub fn get_batch<K: AsRef<str>>(&self, keys: &[K]) -> HashMap<String, V> {
        let now = self.now();
        let mut store = self.inner.store.lock();
        let before = store.len();
        let values = store.get_batch(keys, now);
        if store.len() < before {
            self.persist(&store);
        }
        values
    }

    /// Stores several pairs sharing one TTL, snapshotting once.
    pub fn set_batch<I>(&self, entries: I, ttl: Option<Duration>)
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let now = self.now();
        let mut store = self.inner.store.lock();
        store.set_batch(entries, ttl, now);
        self.persist(&store);
    }

    // == Keys ==
    /// Lists present keys, optionally filtered. May include expired keys the
    /// sweeper has not reached yet.
    pub fn keys(&self, pattern: Option<&Regex>) -> Vec<String> {
        self.inner.store.lock().keys(pattern)
    }

    // == Sweep Expired ==
    /// Removes expired entries and returns how many were removed.
    ///
    /// A snapshot is written only when something was removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.now();
        let mut store = self.inner.store.lock();
        let removed = store.sweep_expired(now);
        if removed > 0 {
            self.persist(&store);
        }
        removed
    }

    // == Introspection ==
    /// Number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.inner.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.store.lock().is_empty()
    }

    pub fn memory_usage(&self) -> usize {
        self.inner.store.lock().memory_usage()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }
}

/// Loads a usable snapshot into `store` and drops what expired or no longer
/// fits while it was stored. Returns whether the store now differs from the
/// stored snapshot.
fn restore<V: Clone + Serialize + DeserializeOwned>(
    store: &mut EntryStore<V>,
    adapter: &SnapshotAdapter,
    now: u64,
) -> bool {
    let Some(snapshot) = adapter.load::<V>(now) else {
        info!("Cache starting cold");
        return false;
    };

    let trimmed = store.restore(snapshot);
    let expired = store.sweep_expired(now);
    info!(entries = store.len(), trimmed, expired, "Cache restored from snapshot");
    trimmed + expired > 0
}
