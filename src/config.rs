//! Configuration module for feedcast.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::{FeedcastError, Result};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "FEEDCAST_CONFIG";

/// Configuration file used when [`CONFIG_PATH_ENV`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Longest accepted refresh or push interval: one year, in minutes.
pub const MAX_INTERVAL_MINS: u64 = 365 * 24 * 60;

/// Client signature sent with every feed request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36 Edg/117.0.2045.40";

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Timezone used for cycle timestamps (e.g., "Asia/Shanghai", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timezone: default_timezone(),
        }
    }
}

/// Feed sources and refresh/push cadence.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedsConfig {
    /// Feed URLs. Their order is the order of every read path.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Minutes between refresh ticks.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_mins: u64,
    /// Minutes between streaming passes (0 = one pass per connection).
    #[serde(default)]
    pub push_interval_mins: u64,
    /// User agent sent to upstream feeds.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Total request timeout in seconds (0 = rely on the network stack).
    #[serde(default)]
    pub request_timeout_secs: u64,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// Maximum fetches in flight across all ticks (0 = unbounded).
    #[serde(default)]
    pub max_concurrent_fetches: usize,
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            refresh_interval_mins: default_refresh_interval(),
            push_interval_mins: 0,
            user_agent: default_user_agent(),
            request_timeout_secs: 0,
            max_feed_size_bytes: default_max_feed_size(),
            max_concurrent_fetches: 0,
        }
    }
}

impl FeedsConfig {
    /// Interval between refresh ticks.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_mins.saturating_mul(60))
    }

    /// Interval between streaming passes. Zero means a single pass.
    pub fn push_interval(&self) -> Duration {
        Duration::from_secs(self.push_interval_mins.saturating_mul(60))
    }

    /// Request timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional path to a log file. Console only when absent.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Web UI configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Whether to serve the dashboard's static files.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
}

fn default_static_path() -> String {
    "static".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            serve_static: false,
            static_path: default_static_path(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Feed configuration.
    #[serde(default)]
    pub feeds: FeedsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web UI configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FeedcastError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file, apply environment variable
    /// overrides and validate the result.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Path of the configuration file, honouring [`CONFIG_PATH_ENV`].
    pub fn path_from_env() -> String {
        std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FeedcastError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FEEDCAST_HOST`: Override the bind address
    /// - `FEEDCAST_PORT`: Override the listen port
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("FEEDCAST_HOST") {
            if !host.is_empty() {
                self.server.host = host;
            }
        }
        if let Ok(port) = std::env::var("FEEDCAST_PORT") {
            if !port.is_empty() {
                self.server.port = port
                    .parse()
                    .map_err(|_| FeedcastError::Config(format!("invalid FEEDCAST_PORT: {port}")))?;
            }
        }
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The refresh interval is zero
    /// - The refresh or push interval is longer than a year
    /// - A source is not an absolute http(s) URL, or is listed twice
    /// - The timezone is not a known IANA name
    pub fn validate(&self) -> Result<()> {
        if self.feeds.refresh_interval_mins == 0 {
            return Err(FeedcastError::Config(
                "feeds.refresh_interval_mins must be greater than zero".to_string(),
            ));
        }

        for (name, mins) in [
            ("refresh_interval_mins", self.feeds.refresh_interval_mins),
            ("push_interval_mins", self.feeds.push_interval_mins),
        ] {
            if mins > MAX_INTERVAL_MINS {
                return Err(FeedcastError::Config(format!(
                    "feeds.{name} must be at most {MAX_INTERVAL_MINS}"
                )));
            }
        }

        let mut seen = HashSet::new();
        for source in &self.feeds.sources {
            let parsed = url::Url::parse(source)
                .map_err(|e| FeedcastError::Config(format!("invalid source {source}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(FeedcastError::Config(format!(
                    "unsupported URL scheme in source {source}"
                )));
            }
            if !seen.insert(source.as_str()) {
                return Err(FeedcastError::Config(format!("duplicate source {source}")));
            }
        }

        if self.server.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(FeedcastError::Config(format!(
                "unknown timezone: {}",
                self.server.timezone
            )));
        }

        Ok(())
    }
}
