//! Error types for feedcast.

use thiserror::Error;

/// Common error type for feedcast.
#[derive(Error, Debug)]
pub enum FeedcastError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    ///
    /// Raised while loading or validating the configuration file. This is
    /// the only error that aborts startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network or HTTP-level failure while fetching a feed.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The fetched body is not a feed we can parse.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type alias for feedcast operations.
pub type Result<T> = std::result::Result<T, FeedcastError>;
