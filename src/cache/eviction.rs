//! Eviction Policies Module
//!
//! Victim selection for the two eviction triggers:
//! - Capacity: drop the least recently used tenth of the entries
//! - Memory: drop the largest entries until usage fits the budget
//!
//! Both scan the full entry map. Eviction is rare compared to reads and
//! writes, so no auxiliary ordering structure is maintained.

use std::collections::HashMap;

use crate::cache::CacheEntry;

/// Share of entries removed by one capacity eviction pass
pub const CAPACITY_EVICTION_DIVISOR: usize = 10;

// == Capacity Victims ==
/// Returns the keys to evict before inserting into a store holding `entries`.
///
/// Empty while the store is below `max_entries`. Otherwise returns the
/// `len / 10` (at least one) entries with the oldest `last_accessed_at`,
/// ties broken by the recency tick.
pub fn capacity_victims<V>(
    entries: &HashMap<String, CacheEntry<V>>,
    max_entries: usize,
) -> Vec<String> {
    if entries.len() < max_entries {
        return Vec::new();
    }

    let count = (entries.len() / CAPACITY_EVICTION_DIVISOR).max(1);

    let mut ranked: Vec<(&String, (u64, u64))> = entries
        .iter()
        .map(|(key, entry)| (key, entry.recency()))
        .collect();
    ranked.sort_by_key(|(_, recency)| *recency);

    ranked
        .into_iter()
        .take(count)
        .map(|(key, _)| key.clone())
        .collect()
}

// == Memory Usage ==
/// Sum of the estimated sizes of all entries.
pub fn memory_usage<V>(entries: &HashMap<String, CacheEntry<V>>) -> usize {
    entries.values().map(|entry| entry.estimated_size).sum()
}

// == Memory Victims ==
/// Returns the keys to evict, largest first, until usage fits `max_memory_bytes`.
///
/// The `protected` key (the entry just inserted) is only selected once it is
/// the last remaining candidate, unless it alone exceeds the budget, in which
/// case it is the only victim. Equal sizes are ordered least recent first.
pub fn memory_victims<V>(
    entries: &HashMap<String, CacheEntry<V>>,
    max_memory_bytes: usize,
    protected: Option<&str>,
) -> Vec<String> {
    let mut usage = memory_usage(entries);
    if usage <= max_memory_bytes {
        return Vec::new();
    }

    if let Some(key) = protected {
        let oversized = entries
            .get(key)
            .is_some_and(|entry| entry.estimated_size > max_memory_bytes);
        if oversized {
            return vec![key.to_string()];
        }
    }

    let mut ranked: Vec<(&String, &CacheEntry<V>)> = entries.iter().collect();
    ranked.sort_by(|(a_key, a), (b_key, b)| {
        let a_protected = protected == Some(a_key.as_str());
        let b_protected = protected == Some(b_key.as_str());
        a_protected
            .cmp(&b_protected)
            .then(b.estimated_size.cmp(&a.estimated_size))
            .then(a.recency().cmp(&b.recency()))
    });

    let mut victims = Vec::new();
    for (key, entry) in ranked {
        if usage <= max_memory_bytes {
            break;
        }
        usage -= entry.estimated_size;
        victims.push(key.clone());
    }
    victims
}
