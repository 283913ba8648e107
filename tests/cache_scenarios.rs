//! Integration Tests for the Cache API
//!
//! Drives `AssetCache` through its public surface with a manual clock and an
//! in-memory snapshot backend.

use std::sync::Arc;
use std::time::Duration;

use asset_cache::cache::{ManualClock, MemoryStorage, SnapshotStorage};
use asset_cache::{AssetCache, CacheConfig, CacheOverrides};

const START: u64 = 1_700_000_000_000;

// == Helper Functions ==

fn config(overrides: CacheOverrides) -> CacheConfig {
    CacheConfig::with_overrides(overrides).unwrap()
}

fn open(
    overrides: CacheOverrides,
    storage: &MemoryStorage,
    clock: &ManualClock,
) -> AssetCache<String> {
    AssetCache::with_clock(
        config(overrides),
        Some(Arc::new(storage.clone()) as Arc<dyn SnapshotStorage>),
        Arc::new(clock.clone()),
    )
    .unwrap()
}

fn fresh() -> (AssetCache<String>, ManualClock, MemoryStorage) {
    let clock = ManualClock::new(START);
    let storage = MemoryStorage::new();
    let cache = open(CacheOverrides::default(), &storage, &clock);
    (cache, clock, storage)
}

// == Scenarios ==

#[test]
fn test_unknown_key_counts_one_miss() {
    let (cache, _, _) = fresh();

    assert_eq!(cache.get("never-set"), None);

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.total_accesses, 1);
}

#[test]
fn test_value_expires_after_ttl() {
    let (cache, clock, _) = fresh();

    cache.set("k", "v".to_string(), Some(Duration::from_millis(500)));
    assert_eq!(cache.get("k"), Some("v".to_string()));
    assert_eq!(cache.stats().hits, 1);

    clock.advance(Duration::from_millis(501));
    assert_eq!(cache.get("k"), None);
    assert!(!cache.has("k"));
}

#[test]
fn test_capacity_eviction_removes_least_recently_used() {
    let clock = ManualClock::new(START);
    let storage = MemoryStorage::new();
    let cache = open(
        CacheOverrides {
            max_entries: Some(2),
            default_ttl: Some(Duration::from_millis(1000)),
            ..Default::default()
        },
        &storage,
        &clock,
    );

    cache.set("x", "1".to_string(), None);
    cache.set("y", "2".to_string(), None);
    assert_eq!(cache.get("x"), Some("1".to_string()));
    cache.set("z", "3".to_string(), None);

    assert_eq!(cache.keys(None), vec!["x", "z"]);
    assert!(!cache.has("y"));
}

#[test]
fn test_capacity_eviction_with_distinct_timestamps() {
    let clock = ManualClock::new(START);
    let storage = MemoryStorage::new();
    let cache = open(
        CacheOverrides {
            max_entries: Some(3),
            ..Default::default()
        },
        &storage,
        &clock,
    );

    for key in ["a", "b", "c"] {
        cache.set(key, key.to_string(), None);
        clock.advance(Duration::from_millis(10));
    }
    cache.get("a");
    clock.advance(Duration::from_millis(10));
    cache.set("d", "d".to_string(), None);

    assert_eq!(cache.len(), 3);
    assert_eq!(cache.keys(None), vec!["a", "c", "d"]);
}

#[test]
fn test_memory_eviction_drops_largest_first() {
    let clock = ManualClock::new(START);
    let storage = MemoryStorage::new();
    let cache = open(
        CacheOverrides {
            max_memory_bytes: Some(1_800),
            ..Default::default()
        },
        &storage,
        &clock,
    );

    cache.set("large", "l".repeat(600), None);
    cache.set("medium", "m".repeat(200), None);
    cache.set("small", "s".repeat(10), None);

    assert!(cache.memory_usage() <= 1_800);
    assert_eq!(cache.keys(None), vec!["medium", "small"]);
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_oversized_insert_keeps_existing_entries() {
    let clock = ManualClock::new(START);
    let storage = MemoryStorage::new();
    let cache = open(
        CacheOverrides {
            max_memory_bytes: Some(1_000),
            ..Default::default()
        },
        &storage,
        &clock,
    );

    cache.set("a", "a".repeat(10), None);
    cache.set("b", "b".repeat(10), None);
    cache.set("huge", "h".repeat(5_000), None);

    assert_eq!(cache.keys(None), vec!["a", "b"]);
    assert_eq!(cache.get("huge"), None);
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_rates_sum_to_hundred() {
    let (cache, _, _) = fresh();
    let stats = cache.stats();
    assert_eq!(stats.hit_rate, 0.0);
    assert_eq!(stats.miss_rate, 0.0);

    cache.set("k", "v".to_string(), None);
    cache.get("k");
    cache.get("k");
    cache.get("missing");

    let stats = cache.stats();
    assert_eq!(stats.hit_rate, 66.67);
    assert_eq!(stats.miss_rate, 33.33);
    assert!((stats.hit_rate + stats.miss_rate - 100.0).abs() < 0.011);
}

#[test]
fn test_clear_resets_size_and_counters() {
    let (cache, _, storage) = fresh();
    cache.set_batch(
        vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())],
        None,
    );
    cache.get("a");
    cache.get("nope");

    cache.clear();
    cache.flush();

    let stats = cache.stats();
    assert_eq!(stats.size, 0);
    assert_eq!(stats.total_accesses, 0);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 0);
    assert!(stats.entries.is_empty());
    assert!(storage.is_empty());
    assert_eq!(cache.get("a"), None);
}

#[test]
fn test_snapshot_roundtrip_across_instances() {
    let clock = ManualClock::new(START);
    let storage = MemoryStorage::new();
    let first = open(CacheOverrides::default(), &storage, &clock);

    first.set("keep-1", "alpha".to_string(), None);
    first.set("keep-2", "beta".to_string(), Some(Duration::from_secs(7200)));
    first.get("keep-1");
    first.get("missing");
    // Reads do not write snapshots; this set captures the counters above
    first.set("expiring", "gamma".to_string(), Some(Duration::from_secs(60)));
    first.flush();

    clock.advance(Duration::from_secs(120));
    let second = open(CacheOverrides::default(), &storage, &clock);

    assert_eq!(second.len(), 2);
    assert_eq!(second.get("keep-1"), Some("alpha".to_string()));
    assert_eq!(second.get("keep-2"), Some("beta".to_string()));
    assert_eq!(second.get("expiring"), None);

    // Counters carried over from the first instance, plus the reads above
    let stats = second.stats();
    assert_eq!(stats.hits, 1 + 2);
    assert_eq!(stats.misses, 1 + 1);
}

#[test]
fn test_stale_snapshot_starts_cold_and_clears_backend() {
    let clock = ManualClock::new(START);
    let storage = MemoryStorage::new();
    let first = open(CacheOverrides::default(), &storage, &clock);
    first.set("k", "v".to_string(), Some(Duration::from_secs(48 * 60 * 60)));
    first.flush();
    assert!(!storage.is_empty());

    clock.advance(Duration::from_secs(25 * 60 * 60));
    let second = open(CacheOverrides::default(), &storage, &clock);

    assert_eq!(second.stats().size, 0);
    assert!(storage.is_empty());
}

#[test]
fn test_corrupt_snapshot_starts_cold() {
    let clock = ManualClock::new(START);
    let storage = MemoryStorage::new();
    storage.write(b"definitely not a snapshot").unwrap();

    let cache = open(CacheOverrides::default(), &storage, &clock);

    assert!(cache.is_empty());
    assert!(storage.is_empty());
}

#[test]
fn test_get_batch_omits_absent_and_expired() {
    let (cache, clock, _) = fresh();
    cache.set("live", "1".to_string(), None);
    cache.set("short", "2".to_string(), Some(Duration::from_millis(10)));
    clock.advance(Duration::from_millis(20));

    let values = cache.get_batch(&["live", "short", "absent"]);

    assert_eq!(values.len(), 1);
    assert_eq!(values["live"], "1");
}

#[tokio::test]
async fn test_preload_with_one_failing_key() {
    let (cache, _, _) = fresh();

    let report = cache
        .preload(["a", "b"], |key| async move {
            match key.as_str() {
                "a" => Ok("loaded".to_string()),
                _ => Err(std::io::Error::new(std::io::ErrorKind::Other, "upstream down")),
            }
        })
        .await;

    assert!(cache.has("a"));
    assert!(!cache.has("b"));
    assert_eq!(report.loaded, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_abandoned_preload_still_populates_cache() {
    let (cache, _, _) = fresh();

    let pending = cache.preload(["slow"], |key| async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<_, String>(key)
    });
    // Give up on the preload as soon as the loader has been spawned
    let _ = tokio::time::timeout(Duration::from_millis(10), pending).await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(cache.get("slow"), Some("slow".to_string()));
}
