//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use feedcast::config::FeedsConfig;
use feedcast::{FeedCache, FeedFetcher, FeedSnapshot, Item};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build an RSS 2.0 document whose items have the given links, newest first.
pub fn rss(title: &str, links: &[&str]) -> String {
    let items: String = links
        .iter()
        .map(|link| {
            format!(
                "<item><title>Item {link}</title><link>{link}</link>\
                 <description>About {link}</description></item>"
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>{title}</title>
    <link>https://example.com/</link>
    <description>Test feed</description>
    {items}
  </channel>
</rss>"#
    )
}

/// Serve `body` as an RSS feed at `route` until the server is reset.
pub async fn mount_feed(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

/// Like [`mount_feed`], but every response is held back for `delay`.
pub async fn mount_slow_feed(server: &MockServer, route: &str, body: String, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string(body)
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Fetcher over a fresh cache with default settings.
pub fn fetcher() -> Arc<FeedFetcher> {
    fetcher_with(&FeedsConfig::default())
}

/// Fetcher over a fresh cache with the given settings.
pub fn fetcher_with(config: &FeedsConfig) -> Arc<FeedFetcher> {
    Arc::new(FeedFetcher::new(Arc::new(FeedCache::new()), config).expect("client builds"))
}

/// Snapshot with one item per link.
pub fn snapshot(title: &str, links: &[&str], last_update: &str) -> FeedSnapshot {
    FeedSnapshot {
        title: title.to_string(),
        link: format!("https://{}.example/", title.to_lowercase().replace(' ', "-")),
        items: links
            .iter()
            .map(|l| Item::new(*l, format!("Item {l}"), format!("About {l}")))
            .collect(),
        last_update: last_update.to_string(),
    }
}

/// Source list as the shared slice the components expect.
pub fn sources(list: &[&str]) -> Arc<[String]> {
    list.iter().map(|s| s.to_string()).collect()
}
