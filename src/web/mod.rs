//! Web interface for feedcast.
//!
//! This module exposes the feed cache over HTTP (a JSON snapshot query)
//! and WebSocket (a periodic snapshot push), plus optional static hosting
//! of the dashboard.

pub mod handlers;
pub mod router;
pub mod server;
pub mod stream;

pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
pub use stream::{StreamBroadcaster, StreamEnd};
