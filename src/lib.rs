//! feedcast - Feed aggregation service.
//!
//! Keeps an in-memory cache of a fixed set of RSS/Atom feeds, refreshes it
//! in the background, and serves it to dashboards as a JSON snapshot or a
//! WebSocket stream.

pub mod app;
pub mod config;
pub mod datetime;
pub mod error;
pub mod feed;
pub mod logging;
pub mod web;

pub use app::Application;
pub use config::Config;
pub use error::{FeedcastError, Result};
pub use feed::{
    FeedCache, FeedFetcher, FeedSnapshot, Item, RefreshOutcome, RefreshScheduler, SnapshotReader,
};
pub use web::{StreamBroadcaster, StreamEnd, WebServer};
