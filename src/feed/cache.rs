//! In-memory feed cache.
//!
//! Maps each source URL to the latest accepted [`FeedSnapshot`]. Snapshots
//! are stored behind `Arc` and replaced as whole values under the write
//! lock, so a reader holding a snapshot always sees one consistent fetch.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use super::types::FeedSnapshot;

/// Concurrent source → snapshot store shared by every component.
///
/// Any number of readers proceed in parallel; a writer holds the lock only
/// for the duration of one map insert.
#[derive(Debug, Default)]
pub struct FeedCache {
    entries: RwLock<HashMap<String, Arc<FeedSnapshot>>>,
}

impl FeedCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for `source`.
    pub async fn upsert(&self, source: &str, snapshot: FeedSnapshot) {
        let snapshot = Arc::new(snapshot);
        let mut entries = self.entries.write().await;
        entries.insert(source.to_string(), snapshot);
    }

    /// Replace the entry for `source` unless the cached snapshot already
    /// has the same newest item.
    ///
    /// The check and the write happen under one write lock, so two
    /// overlapping fetches of the same source cannot both decide to write
    /// the same content. Returns whether the entry was written.
    pub async fn upsert_if_changed(&self, source: &str, snapshot: FeedSnapshot) -> bool {
        let snapshot = Arc::new(snapshot);
        let mut entries = self.entries.write().await;

        if let Some(cached) = entries.get(source) {
            if cached.is_unchanged_by(&snapshot) {
                debug!(source, "newest item unchanged, keeping cached snapshot");
                return false;
            }
        }

        entries.insert(source.to_string(), snapshot);
        true
    }

    /// Current snapshot for `source`, or `None` if no fetch has succeeded yet.
    pub async fn get(&self, source: &str) -> Option<Arc<FeedSnapshot>> {
        self.entries.read().await.get(source).cloned()
    }

    /// Present snapshots for `sources`, in the given order.
    ///
    /// Sources without an entry are skipped. All lookups share one read
    /// lock, so the result reflects a single point in time.
    pub async fn snapshot_all<S: AsRef<str>>(&self, sources: &[S]) -> Vec<Arc<FeedSnapshot>> {
        let entries = self.entries.read().await;
        sources
            .iter()
            .filter_map(|source| entries.get(source.as_ref()).cloned())
            .collect()
    }

    /// Number of sources with a cached snapshot.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no source has been fetched yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
