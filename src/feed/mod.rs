//! Feed cache and refresh machinery.
//!
//! This module holds the in-memory snapshot cache, the fetcher that fills
//! it, the scheduler that drives the fetcher, and the read-only views used
//! by the web layer.

pub mod cache;
pub mod fetcher;
pub mod reader;
pub mod scheduler;
pub mod types;

pub use cache::FeedCache;
pub use fetcher::{parse_feed, FeedFetcher, RefreshOutcome};
pub use reader::SnapshotReader;
pub use scheduler::RefreshScheduler;
pub use types::{FeedSnapshot, Item, ParsedFeed, ParsedItem};
