//! Cache Module
//!
//! Bounded in-memory asset cache with TTL expiry, LRU and memory eviction,
//! durable snapshots, and batch preloading.

mod asset_cache;
pub mod clock;
mod entry;
pub mod eviction;
mod loader;
pub mod persistence;
mod stats;
mod store;
mod writer;


// Re-export public types
pub use asset_cache::{AssetCache, CacheValue};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{estimate_size, CacheEntry};
pub use loader::PreloadReport;
pub use persistence::{
    FileStorage, MemoryStorage, PersistedSnapshot, SnapshotAdapter, SnapshotStorage,
};
pub use stats::{CacheStats, KeyStats, StatsSnapshot};
pub use store::EntryStore;
