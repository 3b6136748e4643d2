//! Feed fetcher.
//!
//! Fetches one source over HTTP, parses it as RSS or Atom, and offers the
//! result to the cache through change detection.

use std::sync::Arc;

use feed_rs::model::Link;
use feed_rs::parser;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::FeedsConfig;
use crate::error::{FeedcastError, Result};
use crate::feed::cache::FeedCache;
use crate::feed::types::{FeedSnapshot, ParsedFeed, ParsedItem};

/// What a refresh did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot was written.
    Updated,
    /// The newest item matched the cached one; nothing was written.
    Unchanged,
    /// Fetching or parsing failed; the cached entry, if any, is kept.
    Failed,
}

/// Fetches sources and writes accepted snapshots into the shared cache.
pub struct FeedFetcher {
    client: Client,
    cache: Arc<FeedCache>,
    max_feed_size: u64,
}

impl FeedFetcher {
    /// Create a fetcher writing into `cache`.
    ///
    /// No request timeout is set unless `config.request_timeout_secs` is
    /// non-zero; a hung connection then only occupies its own task.
    pub fn new(cache: Arc<FeedCache>, config: &FeedsConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FeedcastError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            cache,
            max_feed_size: config.max_feed_size_bytes,
        })
    }

    /// The cache this fetcher writes into.
    pub fn cache(&self) -> &Arc<FeedCache> {
        &self.cache
    }

    /// Fetch and parse a feed from the given URL.
    pub async fn fetch(&self, url: &str) -> Result<ParsedFeed> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedcastError::Fetch(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FeedcastError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(FeedcastError::Fetch(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, self.max_feed_size
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FeedcastError::Fetch(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > self.max_feed_size {
            return Err(FeedcastError::Fetch(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_feed_size
            )));
        }

        parse_feed(&bytes)
    }

    /// Fetch `source` and, if its newest item changed, store it with
    /// `cycle_timestamp` as its `lastUpdate`.
    pub async fn refresh(&self, source: &str, cycle_timestamp: &str) -> RefreshOutcome {
        match self.fetch(source).await {
            Ok(parsed) => self.apply(source, parsed, cycle_timestamp).await,
            Err(e) => {
                warn!(source, error = %e, "Failed to refresh feed");
                RefreshOutcome::Failed
            }
        }
    }

    /// Offer an already parsed feed to the cache.
    pub async fn apply(
        &self,
        source: &str,
        parsed: ParsedFeed,
        cycle_timestamp: &str,
    ) -> RefreshOutcome {
        let snapshot = FeedSnapshot::from_parsed(parsed, cycle_timestamp);
        let item_count = snapshot.items.len();

        if self.cache.upsert_if_changed(source, snapshot).await {
            info!(source, items = item_count, "Feed updated");
            RefreshOutcome::Updated
        } else {
            debug!(source, "Feed unchanged");
            RefreshOutcome::Unchanged
        }
    }
}

/// Parse feed bytes (RSS 0.9x/1.0/2.0, Atom or JSON Feed) into a ParsedFeed.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed> {
    let feed = parser::parse(bytes)
        .map_err(|e| FeedcastError::Parse(format!("failed to parse feed: {}", e)))?;

    let title = feed.title.map(|t| t.content).unwrap_or_default();
    let link = primary_link(&feed.links).unwrap_or_default();

    let items = feed
        .entries
        .into_iter()
        .map(|entry| ParsedItem {
            link: primary_link(&entry.links).unwrap_or_default(),
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            description: entry.summary.map(|t| t.content).unwrap_or_default(),
        })
        .collect();

    Ok(ParsedFeed { title, link, items })
}

/// Pick the human-facing link: the first `alternate` (or untyped) link,
/// else whatever comes first.
fn primary_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}
