//! Batch Loader Module
//!
//! Concurrent preloading of missing keys through a caller-supplied loader.

use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::asset_cache::{AssetCache, CacheValue};

// == Preload Report ==
/// Outcome counts of one `preload` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PreloadReport {
    /// Distinct keys requested
    pub requested: usize,
    /// Keys already live in the cache, not loaded
    pub skipped: usize,
    /// Keys loaded and stored
    pub loaded: usize,
    /// Keys whose loader failed or panicked
    pub failed: usize,
}

impl<V: CacheValue> AssetCache<V> {
    // == Preload ==
    /// Loads every key that is not already live and stores the results.
    ///
    /// Each load runs as its own tokio task, so loads proceed concurrently
    /// and keep running (and still populate the cache) if the caller stops
    /// awaiting. A failing key is logged and counted; it never affects the
    /// other keys and never fails the call. Must be called from within a
    /// tokio runtime.
    pub async fn preload<I, K, F, Fut, E>(&self, keys: I, loader: F) -> PreloadReport
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: Fn(String) -> Fut,
        Fut: Future<Output = std::result::Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let mut report = PreloadReport::default();
        let mut seen = HashSet::new();
        let mut tasks = Vec::new();

        for key in keys {
            let key: String = key.into();
            if !seen.insert(key.clone()) {
                continue;
            }
            report.requested += 1;

            if self.has(&key) {
                report.skipped += 1;
                continue;
            }

            let cache = self.clone();
            let load = loader(key.clone());
            tasks.push(tokio::spawn(async move {
                match load.await {
                    Ok(value) => {
                        cache.set(key, value, None);
                        true
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "Preload failed");
                        false
                    }
                }
            }));
        }

        for outcome in join_all(tasks).await {
            match outcome {
                Ok(true) => report.loaded += 1,
                Ok(false) => report.failed += 1,
                Err(e) => {
                    warn!(error = %e, "Preload task did not complete");
                    report.failed += 1;
                }
            }
        }

        debug!(
            requested = report.requested,
            skipped = report.skipped,
            loaded = report.loaded,
            failed = report.failed,
            "Preload finished"
        );
        report
    }
}
