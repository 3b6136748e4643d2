//! Router configuration.

use axum::{routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{health_check, keywords, list_feeds, stream_ws_handler, AppState};

/// Create the feed router (`/feeds`, `/keywords`, `/ws`).
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/feeds", get(list_feeds))
        .route("/keywords", get(keywords))
        .route("/ws", get(stream_ws_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create a router serving the dashboard's static files as fallback.
///
/// Returns `None` if the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    if !Path::new(static_path).is_dir() {
        tracing::warn!("Static directory not found: {}", static_path);
        return None;
    }

    Some(Router::new().fallback_service(ServeDir::new(static_path)))
}
