//! HTTP and WebSocket handlers.

use std::future;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    Json,
};
use futures::{SinkExt, StreamExt};

use crate::feed::{FeedSnapshot, SnapshotReader};

use super::stream::StreamBroadcaster;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Read-only view over the feed cache.
    pub reader: SnapshotReader,
    /// Per-connection push loop template.
    pub broadcaster: StreamBroadcaster,
}

impl AppState {
    /// Create handler state from a reader and a push interval.
    pub fn new(reader: SnapshotReader, push_interval: std::time::Duration) -> Self {
        let broadcaster = StreamBroadcaster::new(reader.clone(), push_interval);
        Self {
            reader,
            broadcaster,
        }
    }
}

/// GET /feeds - Cached feeds in configured order.
///
/// Sources that have not been fetched successfully yet are omitted.
pub async fn list_feeds(State(state): State<Arc<AppState>>) -> Json<Vec<Arc<FeedSnapshot>>> {
    Json(state.reader.list_feeds().await)
}

/// GET /keywords - Comma-terminated feed titles for the page metadata.
pub async fn keywords(State(state): State<Arc<AppState>>) -> String {
    state.reader.keywords().await
}

/// GET /health - Liveness probe.
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /ws - Stream cached feeds to the client.
///
/// Each message is one JSON-encoded snapshot. Client messages are ignored.
pub async fn stream_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = format!("ws-{}", uuid::Uuid::new_v4());
    tracing::debug!("WebSocket session started: {}", session_id);

    let (ws_sender, mut ws_receiver) = socket.split();
    let sink = ws_sender
        .with(|text: String| future::ready(Ok::<_, axum::Error>(Message::Text(text.into()))));

    // Resolves once the peer closes or the connection breaks.
    let closed = async move {
        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    };

    let end = state.broadcaster.run(sink, closed).await;
    tracing::debug!("WebSocket session ended: {} ({:?})", session_id, end);
}
