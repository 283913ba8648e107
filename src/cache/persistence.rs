//! Persistence Module
//!
//! Durable snapshots of the whole cache. Saving is best-effort: failures are
//! logged and never reach the cache operation that triggered them.

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::clock::duration_ms;
use crate::cache::{CacheEntry, CacheStats};
use crate::error::Result;

// == Snapshot Storage ==
/// Host-supplied durable backend holding a single named blob.
pub trait SnapshotStorage: Send + Sync + Debug {
    /// Returns the blob, or `None` when nothing has been stored.
    fn read(&self) -> io::Result<Option<Vec<u8>>>;
    /// Replaces the blob.
    fn write(&self, bytes: &[u8]) -> io::Result<()>;
    /// Deletes the blob. Removing a missing blob succeeds.
    fn remove(&self) -> io::Result<()>;
}

// == File Storage ==
/// Stores the snapshot in one file, replaced atomically through a rename.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)
    }

    fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

// == Memory Storage ==
/// In-process blob. Clones share the same blob, so two caches built on
/// clones of one `MemoryStorage` see each other's snapshots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the stored blob.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.blob.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.blob.lock().is_none()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.blob.lock().clone())
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        *self.blob.lock() = Some(bytes.to_vec());
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        *self.blob.lock() = None;
        Ok(())
    }
}

// == Persisted Snapshot ==
/// Serialized form of the whole cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot<V> {
    /// Entries ordered least recently used first
    pub entries: Vec<(String, CacheEntry<V>)>,
    pub stats: CacheStats,
    /// Unix milliseconds at which the snapshot was taken
    pub saved_at: u64,
}

// == Snapshot Adapter ==
/// Encodes snapshots into a storage backend and enforces the maximum age.
///
/// Compression is accepted for configuration compatibility but snapshots are
/// always written as plain JSON.
#[derive(Debug, Clone)]
pub struct SnapshotAdapter {
    storage: Arc<dyn SnapshotStorage>,
    max_age: Duration,
}

impl SnapshotAdapter {
    pub fn new(
        storage: Arc<dyn SnapshotStorage>,
        max_age: Duration,
        compression_enabled: bool,
    ) -> Self {
        if compression_enabled {
            debug!("Snapshot compression requested; snapshots are stored uncompressed");
        }
        Self { storage, max_age }
    }

    // == Save ==
    /// Writes the snapshot, logging and swallowing any failure.
    pub fn save<V: Serialize>(&self, snapshot: &PersistedSnapshot<V>) {
        if let Err(e) = self.try_save(snapshot) {
            warn!(error = %e, "Failed to save cache snapshot");
        }
    }

    /// Writes the snapshot, surfacing failures.
    pub fn try_save<V: Serialize>(&self, snapshot: &PersistedSnapshot<V>) -> Result<()> {
        let bytes = serde_json::to_vec(snapshot)?;
        self.storage.write(&bytes)?;
        debug!(entries = snapshot.entries.len(), bytes = bytes.len(), "Cache snapshot saved");
        Ok(())
    }

    // == Load ==
    /// Reads the stored snapshot if there is a usable one.
    ///
    /// Returns `None` for a cold start: nothing stored, backend failure,
    /// unparseable blob, or a snapshot older than the maximum age. The last
    /// two also clear the backend.
    pub fn load<V: DeserializeOwned>(&self, now: u64) -> Option<PersistedSnapshot<V>> {
        let bytes = match self.storage.read() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("No cache snapshot found, starting cold");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read cache snapshot, starting cold");
                return None;
            }
        };

        let snapshot: PersistedSnapshot<V> = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cache snapshot");
                self.clear();
                return None;
            }
        };

        let age_ms = now.saturating_sub(snapshot.saved_at);
        if age_ms > duration_ms(self.max_age) {
            info!(
                age_secs = age_ms / 1000,
                max_age_secs = self.max_age.as_secs(),
                "Discarding stale cache snapshot"
            );
            self.clear();
            return None;
        }

        Some(snapshot)
    }

    // == Clear ==
    /// Removes the stored snapshot, logging any failure.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove() {
            warn!(error = %e, "Failed to clear cache snapshot");
        }
    }
}
