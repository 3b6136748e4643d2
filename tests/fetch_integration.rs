//! Fetch and refresh tests against a mock upstream.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{fetcher, fetcher_with, mount_feed, mount_slow_feed, rss, sources};
use feedcast::config::FeedsConfig;
use feedcast::{FeedcastError, RefreshOutcome, RefreshScheduler};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetch_parses_feed() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "/feed",
        rss("Feed A", &["https://example.com/2", "https://example.com/1"]),
    )
    .await;

    let parsed = fetcher()
        .fetch(&format!("{}/feed", server.uri()))
        .await
        .unwrap();

    assert_eq!(parsed.title, "Feed A");
    assert_eq!(parsed.items.len(), 2);
    assert_eq!(parsed.items[0].link, "https://example.com/2");
    assert_eq!(parsed.items[0].title, "Item https://example.com/2");
    assert_eq!(parsed.items[1].link, "https://example.com/1");
}

#[tokio::test]
async fn fetch_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(header("user-agent", "feedcast-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss("Feed A", &[])))
        .mount(&server)
        .await;

    let config = FeedsConfig {
        user_agent: "feedcast-test/1.0".to_string(),
        ..FeedsConfig::default()
    };
    let result = fetcher_with(&config)
        .fetch(&format!("{}/feed", server.uri()))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn fetch_rejects_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = fetcher().fetch(&format!("{}/feed", server.uri())).await;
    match result {
        Err(FeedcastError::Fetch(msg)) => assert!(msg.contains("500")),
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_rejects_oversized_feed() {
    let server = MockServer::start().await;
    mount_feed(&server, "/feed", rss("Feed A", &["https://example.com/1"])).await;

    let config = FeedsConfig {
        max_feed_size_bytes: 64,
        ..FeedsConfig::default()
    };
    let result = fetcher_with(&config)
        .fetch(&format!("{}/feed", server.uri()))
        .await;
    match result {
        Err(FeedcastError::Fetch(msg)) => assert!(msg.contains("too large")),
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_rejects_non_feed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let result = fetcher().fetch(&format!("{}/feed", server.uri())).await;
    assert!(matches!(result, Err(FeedcastError::Parse(_))));
}

#[tokio::test]
async fn fetch_times_out_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss("Feed A", &[]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = FeedsConfig {
        request_timeout_secs: 1,
        ..FeedsConfig::default()
    };
    let result = fetcher_with(&config)
        .fetch(&format!("{}/feed", server.uri()))
        .await;
    assert!(matches!(result, Err(FeedcastError::Fetch(_))));
}

#[tokio::test]
async fn refresh_skips_unchanged_then_accepts_new_item() {
    let server = MockServer::start().await;
    let source = format!("{}/feed", server.uri());
    let fetcher = fetcher();

    mount_feed(&server, "/feed", rss("Feed A", &["https://example.com/x"])).await;
    assert_eq!(
        fetcher.refresh(&source, "2024-01-01 00:00:00").await,
        RefreshOutcome::Updated
    );

    // Same newest link: the cached snapshot, lastUpdate included, must stay.
    let before = fetcher.cache().get(&source).await.unwrap();
    assert_eq!(
        fetcher.refresh(&source, "2024-01-01 00:30:00").await,
        RefreshOutcome::Unchanged
    );
    let after = fetcher.cache().get(&source).await.unwrap();
    assert_eq!(after.last_update, "2024-01-01 00:00:00");
    assert_eq!(*after, *before);

    server.reset().await;
    mount_feed(
        &server,
        "/feed",
        rss("Feed A", &["https://example.com/y", "https://example.com/x"]),
    )
    .await;
    assert_eq!(
        fetcher.refresh(&source, "2024-01-01 01:00:00").await,
        RefreshOutcome::Updated
    );

    let updated = fetcher.cache().get(&source).await.unwrap();
    assert_eq!(updated.items[0].link, "https://example.com/y");
    assert_eq!(updated.items.len(), 2);
    assert_eq!(updated.last_update, "2024-01-01 01:00:00");
}

#[tokio::test]
async fn refresh_failure_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    let source = format!("{}/feed", server.uri());
    let fetcher = fetcher();

    mount_feed(&server, "/feed", rss("Feed A", &["https://example.com/x"])).await;
    fetcher.refresh(&source, "t1").await;

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert_eq!(fetcher.refresh(&source, "t2").await, RefreshOutcome::Failed);
    let cached = fetcher.cache().get(&source).await.unwrap();
    assert_eq!(cached.title, "Feed A");
    assert_eq!(cached.last_update, "t1");
}

#[tokio::test]
async fn refresh_failure_without_entry_leaves_source_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = format!("{}/missing", server.uri());
    let fetcher = fetcher();
    assert_eq!(fetcher.refresh(&source, "t1").await, RefreshOutcome::Failed);
    assert!(fetcher.cache().get(&source).await.is_none());
}

#[tokio::test]
async fn scheduler_tick_fills_cache_with_shared_timestamp() {
    let server = MockServer::start().await;
    mount_feed(&server, "/a", rss("Feed A", &["https://example.com/a1"])).await;
    mount_feed(&server, "/b", rss("Feed B", &["https://example.com/b1"])).await;

    let a = format!("{}/a", server.uri());
    let b = format!("{}/b", server.uri());
    let fetcher = fetcher();
    let scheduler = RefreshScheduler::new(
        Arc::clone(&fetcher),
        sources(&[a.as_str(), b.as_str()]),
        Duration::from_secs(60),
        "UTC",
    );

    for handle in scheduler.tick() {
        handle.await.unwrap();
    }

    let feed_a = fetcher.cache().get(&a).await.unwrap();
    let feed_b = fetcher.cache().get(&b).await.unwrap();
    assert_eq!(feed_a.title, "Feed A");
    assert_eq!(feed_b.title, "Feed B");
    assert_eq!(feed_a.last_update, feed_b.last_update);
}

#[tokio::test]
async fn scheduler_with_fetch_cap_limits_requests_in_flight() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(400);
    let mut list = Vec::new();
    for i in 0..4 {
        let route = format!("/feed{i}");
        mount_slow_feed(
            &server,
            &route,
            rss(&format!("Feed {i}"), &["https://example.com/1"]),
            delay,
        )
        .await;
        list.push(format!("{}{}", server.uri(), route));
    }

    let fetcher = fetcher();
    let refs: Vec<&str> = list.iter().map(String::as_str).collect();
    let scheduler = RefreshScheduler::new(
        Arc::clone(&fetcher),
        sources(&refs),
        Duration::from_secs(60),
        "UTC",
    )
    .with_max_concurrent_fetches(2);

    let started = Instant::now();
    let handles = scheduler.tick();

    // Requests are recorded on arrival, before the delayed response.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let arrived = server.received_requests().await.unwrap().len();
    assert!(arrived <= 2, "{arrived} requests in flight with a cap of 2");

    for handle in handles {
        handle.await.unwrap();
    }
    // Two waves of two.
    assert!(started.elapsed() >= delay * 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
    assert_eq!(fetcher.cache().len().await, 4);
}

#[tokio::test]
async fn scheduler_with_fetch_cap_survives_hung_source() {
    let server = MockServer::start().await;
    mount_slow_feed(
        &server,
        "/hang",
        rss("Hung", &["https://example.com/h"]),
        Duration::from_secs(3600),
    )
    .await;
    mount_feed(&server, "/ok", rss("Feed OK", &["https://example.com/1"])).await;

    let hang = format!("{}/hang", server.uri());
    let ok = format!("{}/ok", server.uri());
    let fetcher = fetcher();
    let handle = RefreshScheduler::new(
        Arc::clone(&fetcher),
        sources(&[hang.as_str(), ok.as_str()]),
        Duration::from_millis(100),
        "UTC",
    )
    .with_max_concurrent_fetches(1)
    .spawn();

    let mut cached = None;
    for _ in 0..150 {
        cached = fetcher.cache().get(&ok).await;
        if cached.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    handle.abort();

    assert_eq!(cached.expect("healthy source refreshed").title, "Feed OK");
    assert!(fetcher.cache().get(&hang).await.is_none());
}

#[tokio::test]
async fn scheduler_run_refreshes_immediately_and_periodically() {
    let server = MockServer::start().await;
    mount_feed(&server, "/feed", rss("Feed A", &["https://example.com/1"])).await;
    let source = format!("{}/feed", server.uri());

    let fetcher = fetcher();
    let handle = RefreshScheduler::new(
        Arc::clone(&fetcher),
        sources(&[source.as_str()]),
        Duration::from_millis(100),
        "UTC",
    )
    .spawn();

    // First tick fires right away.
    let mut cached = None;
    for _ in 0..50 {
        cached = fetcher.cache().get(&source).await;
        if cached.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(cached.unwrap().title, "Feed A");

    tokio::time::sleep(Duration::from_millis(350)).await;
    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() >= 2, "expected periodic refreshes");

    handle.abort();
}
