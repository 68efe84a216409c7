//! Lenient timestamp parsing for the `created_at`/`updated_at` columns.
//!
//! Inputs carrying an offset are converted to UTC; inputs without one are
//! taken to already be UTC. Slash dates are read month first, falling back to
//! day first when the month-first reading is impossible.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Output shape of every normalized timestamp.
pub const UTC_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    // `%B` also accepts the abbreviated month name when parsing.
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

/// Strips a trailing `Z` or `UTC` designator so the naive formats can read
/// the rest as UTC.
fn strip_utc_designator(value: &str) -> &str {
    value
        .strip_suffix("UTC")
        .or_else(|| value.strip_suffix('Z'))
        .map(str::trim_end)
        .unwrap_or(value)
}

pub fn parse_utc_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    let naive = strip_utc_designator(trimmed);
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(parsed.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(naive, fmt) {
            return parsed.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// Parses `value` and renders it as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn normalize_timestamp(value: &str) -> Option<String> {
    parse_utc_timestamp(value).map(|dt| dt.format(UTC_TIMESTAMP_FORMAT).to_string())
}
