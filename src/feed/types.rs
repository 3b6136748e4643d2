//! Feed types for feedcast.

use serde::{Deserialize, Serialize};

/// One entry of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Entry link. Used as the entry's identity by change detection.
    pub link: String,
    /// Entry title.
    pub title: String,
    /// Entry description, as published upstream.
    pub description: String,
}

impl Item {
    /// Create a new item.
    pub fn new(
        link: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Cached state of one source, as accepted by the cache.
///
/// Snapshots are never mutated in place; a newer fetch replaces the whole
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    /// Feed title.
    pub title: String,
    /// Link of the feed itself (usually the site URL).
    pub link: String,
    /// Entries, newest first.
    pub items: Vec<Item>,
    /// Cycle timestamp of the refresh tick that produced this snapshot.
    pub last_update: String,
}

impl FeedSnapshot {
    /// Build a snapshot from a freshly parsed feed.
    pub fn from_parsed(parsed: ParsedFeed, cycle_timestamp: impl Into<String>) -> Self {
        Self {
            title: parsed.title,
            link: parsed.link,
            items: parsed
                .items
                .into_iter()
                .map(|item| Item {
                    link: item.link,
                    title: item.title,
                    description: item.description,
                })
                .collect(),
            last_update: cycle_timestamp.into(),
        }
    }

    /// Link of the newest item, if any.
    pub fn newest_link(&self) -> Option<&str> {
        self.items.first().map(|item| item.link.as_str())
    }

    /// Whether `incoming` carries nothing new compared to `self`.
    ///
    /// Only the newest item's link is compared; edits, reordering and
    /// deletions further down the list are not detected. A feed with no
    /// items on either side always counts as changed.
    pub fn is_unchanged_by(&self, incoming: &FeedSnapshot) -> bool {
        match (self.newest_link(), incoming.newest_link()) {
            (Some(cached), Some(new)) => cached == new,
            _ => false,
        }
    }
}

/// Parsed feed data from upstream, before it is accepted into the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFeed {
    /// Feed title.
    pub title: String,
    /// Feed link.
    pub link: String,
    /// Items, in upstream order.
    pub items: Vec<ParsedItem>,
}

/// Parsed item data from upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    /// Item link.
    pub link: String,
    /// Item title.
    pub title: String,
    /// Item description.
    pub description: String,
}
