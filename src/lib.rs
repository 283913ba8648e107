//! Asset Cache - A bounded, time- and memory-aware key/value cache
//!
//! Provides TTL expiry, LRU and memory eviction, durable snapshots,
//! batch preloading, and an HTTP admin surface for inspection.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::AssetCache;
pub use config::{CacheConfig, CacheOverrides, Config};
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
