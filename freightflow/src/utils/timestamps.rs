//! Timestamp helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// A UTC timestamp.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Formats a timestamp as RFC 3339 with microsecond precision and a `Z` suffix.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use freightflow::utils::format_rfc3339;
///
/// let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
/// assert_eq!(format_rfc3339(&ts), "2024-03-01T12:00:00.000000Z");
/// ```
#[must_use]
pub fn format_rfc3339(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
