//! Read-only views over the feed cache.

use std::sync::Arc;

use crate::feed::cache::FeedCache;
use crate::feed::types::FeedSnapshot;

/// Query surface used by the HTTP endpoints and the stream broadcaster.
///
/// Cloning is cheap; every clone reads the same cache.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    cache: Arc<FeedCache>,
    sources: Arc<[String]>,
}

impl SnapshotReader {
    /// Create a reader over `cache` iterating `sources` in order.
    pub fn new(cache: Arc<FeedCache>, sources: Arc<[String]>) -> Self {
        Self { cache, sources }
    }

    /// Configured sources, in read order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Current snapshot for one source.
    pub async fn get(&self, source: &str) -> Option<Arc<FeedSnapshot>> {
        self.cache.get(source).await
    }

    /// Snapshots of all sources that have data, in configured order.
    pub async fn list_feeds(&self) -> Vec<Arc<FeedSnapshot>> {
        self.cache.snapshot_all(&self.sources[..]).await
    }

    /// Non-empty feed titles, each followed by a comma.
    pub async fn keywords(&self) -> String {
        self.list_feeds()
            .await
            .iter()
            .filter(|feed| !feed.title.is_empty())
            .fold(String::new(), |mut words, feed| {
                words.push_str(&feed.title);
                words.push(',');
                words
            })
    }
}
