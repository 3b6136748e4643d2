//! Application wiring.
//!
//! Builds the shared cache once and hands it to the fetcher, scheduler,
//! readers and web server.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::Result;
use crate::feed::{FeedCache, FeedFetcher, RefreshScheduler, SnapshotReader};
use crate::web::{AppState, WebServer};

/// Main application holding the shared feed cache.
pub struct Application {
    /// Application configuration.
    config: Arc<Config>,
    /// Shared feed cache.
    cache: Arc<FeedCache>,
    /// Configured sources, in read order.
    sources: Arc<[String]>,
    /// Fetcher writing into the cache.
    fetcher: Arc<FeedFetcher>,
}

impl Application {
    /// Create a new application instance. `config` should already be
    /// validated.
    pub fn new(config: Config) -> Result<Self> {
        let cache = Arc::new(FeedCache::new());
        let sources: Arc<[String]> = config.feeds.sources.clone().into();
        let fetcher = Arc::new(FeedFetcher::new(Arc::clone(&cache), &config.feeds)?);

        Ok(Self {
            config: Arc::new(config),
            cache,
            sources,
            fetcher,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the feed cache.
    pub fn cache(&self) -> &Arc<FeedCache> {
        &self.cache
    }

    /// Create a reader over the cache.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader::new(Arc::clone(&self.cache), Arc::clone(&self.sources))
    }

    /// Start the background refresh loop.
    pub fn start_scheduler(&self) -> JoinHandle<()> {
        RefreshScheduler::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.sources),
            self.config.feeds.refresh_interval(),
            self.config.server.timezone.clone(),
        )
        .with_max_concurrent_fetches(self.config.feeds.max_concurrent_fetches)
        .spawn()
    }

    /// Build the web server for this application.
    pub fn web_server(&self) -> Result<WebServer> {
        let state = AppState::new(self.reader(), self.config.feeds.push_interval());
        WebServer::new(&self.config.server, &self.config.web, state)
    }

    /// Start the scheduler and serve until the server stops.
    pub async fn run(self) -> Result<()> {
        let server = self.web_server()?;
        let _scheduler = self.start_scheduler();
        server.run().await
    }
}
