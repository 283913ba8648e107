//! Configuration Module
//!
//! Cache configuration with defaults and caller overrides, plus the host
//! configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

// == Defaults ==
pub const DEFAULT_MAX_ENTRIES: usize = 1000;
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_SNAPSHOT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_SNAPSHOT_PATH: &str = "asset_cache_snapshot.json";

// == Cache Config ==
/// Cache parameters. Immutable once a cache is built from them.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Entry count that triggers capacity eviction
    pub max_entries: usize,
    /// TTL applied when `set` is called without one
    pub default_ttl: Duration,
    /// Estimated memory budget in bytes
    pub max_memory_bytes: usize,
    /// Whether mutations are snapshotted to the storage backend
    pub persistence_enabled: bool,
    /// Accepted but not acted upon; snapshots are always stored uncompressed
    pub compression_enabled: bool,
    /// Period of the background TTL sweep
    pub sweep_interval: Duration,
    /// Snapshots older than this are discarded on load
    pub snapshot_max_age: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: DEFAULT_TTL,
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            persistence_enabled: true,
            compression_enabled: false,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            snapshot_max_age: DEFAULT_SNAPSHOT_MAX_AGE,
        }
    }
}

// == Cache Overrides ==
/// Caller-supplied values merged over the defaults at construction time.
#[derive(Debug, Clone, Default)]
pub struct CacheOverrides {
    pub max_entries: Option<usize>,
    pub default_ttl: Option<Duration>,
    pub max_memory_bytes: Option<usize>,
    pub persistence_enabled: Option<bool>,
    pub compression_enabled: Option<bool>,
    pub sweep_interval: Option<Duration>,
    pub snapshot_max_age: Option<Duration>,
}

impl CacheConfig {
    /// Merges `overrides` over the defaults and validates the result.
    pub fn with_overrides(overrides: CacheOverrides) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            max_entries: overrides.max_entries.unwrap_or(defaults.max_entries),
            default_ttl: overrides.default_ttl.unwrap_or(defaults.default_ttl),
            max_memory_bytes: overrides
                .max_memory_bytes
                .unwrap_or(defaults.max_memory_bytes),
            persistence_enabled: overrides
                .persistence_enabled
                .unwrap_or(defaults.persistence_enabled),
            compression_enabled: overrides
                .compression_enabled
                .unwrap_or(defaults.compression_enabled),
            sweep_interval: overrides.sweep_interval.unwrap_or(defaults.sweep_interval),
            snapshot_max_age: overrides
                .snapshot_max_age
                .unwrap_or(defaults.snapshot_max_age),
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make the cache unusable.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfig(
                "max_entries must be greater than zero".to_string(),
            ));
        }
        if self.max_memory_bytes == 0 {
            return Err(CacheError::InvalidConfig(
                "max_memory_bytes must be greater than zero".to_string(),
            ));
        }
        if self.default_ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "default_ttl must be greater than zero".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// == Host Config ==
/// Server configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache parameters
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// File holding the cache snapshot
    pub snapshot_path: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL_SECS` - Default TTL in seconds (default: 3600)
    /// - `MAX_MEMORY_BYTES` - Memory budget in bytes (default: 50 MiB)
    /// - `PERSISTENCE_ENABLED` - Snapshot to disk (default: true)
    /// - `COMPRESSION_ENABLED` - Accepted, no effect (default: false)
    /// - `SWEEP_INTERVAL_SECS` - TTL sweep period in seconds (default: 300)
    /// - `SNAPSHOT_MAX_AGE_SECS` - Snapshot max age in seconds (default: 86400)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SNAPSHOT_PATH` - Snapshot file (default: asset_cache_snapshot.json)
    ///
    /// Unparseable values fall back to their defaults. Values that parse but
    /// are invalid, such as `MAX_ENTRIES=0`, are rejected.
    pub fn from_env() -> Result<Self> {
        let overrides = CacheOverrides {
            max_entries: env_parse("MAX_ENTRIES"),
            default_ttl: env_parse("DEFAULT_TTL_SECS").map(Duration::from_secs),
            max_memory_bytes: env_parse("MAX_MEMORY_BYTES"),
            persistence_enabled: env_parse("PERSISTENCE_ENABLED"),
            compression_enabled: env_parse("COMPRESSION_ENABLED"),
            sweep_interval: env_parse("SWEEP_INTERVAL_SECS").map(Duration::from_secs),
            snapshot_max_age: env_parse("SNAPSHOT_MAX_AGE_SECS").map(Duration::from_secs),
        };

        Ok(Self {
            cache: CacheConfig::with_overrides(overrides)?,
            server_port: env_parse("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT_PATH)),
        })
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
