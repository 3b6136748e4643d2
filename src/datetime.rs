//! Date/time utilities for feedcast.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Format used for the `lastUpdate` label of a snapshot.
pub const CYCLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a DateTime<Utc> in the given timezone.
///
/// # Arguments
///
/// * `dt` - DateTime in UTC
/// * `timezone` - Timezone name (e.g., "Asia/Shanghai", "UTC")
/// * `format` - Output format string (e.g., "%Y-%m-%d %H:%M:%S")
///
/// Falls back to UTC when the timezone is unknown.
pub fn format_utc_datetime(dt: &DateTime<Utc>, timezone: &str, format: &str) -> String {
    let tz: Tz = match timezone.parse() {
        Ok(tz) => tz,
        Err(_) => return dt.format(format).to_string(),
    };
    dt.with_timezone(&tz).format(format).to_string()
}

/// Label shared by every fetch launched in one refresh tick.
pub fn cycle_timestamp(dt: &DateTime<Utc>, timezone: &str) -> String {
    format_utc_datetime(dt, timezone, CYCLE_TIMESTAMP_FORMAT)
}

/// Cycle timestamp for the current instant.
pub fn cycle_timestamp_now(timezone: &str) -> String {
    cycle_timestamp(&Utc::now(), timezone)
}
