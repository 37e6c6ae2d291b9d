//! Date and time formatting for CSV values
//!
//! Submissions carry ISO 8601 values. The CSV output uses a human readable
//! form: `Jan 5, 2018` for dates, `1:05:09 PM` for times, and both joined for
//! datetimes. Datetimes are always converted to UTC before formatting.
//!
//! Values that cannot be parsed are passed through unchanged.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const DATE_FORMAT: &str = "%b %-d, %Y";
const TIME_FORMAT: &str = "%-I:%M:%S %p";
const DATETIME_FORMAT: &str = "%b %-d, %Y %-I:%M:%S %p";

/// Formats an ISO date (`YYYY-MM-DD`, trailing content ignored)
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => {
            tracing::debug!(value = raw, "Unparseable date value, keeping raw text");
            raw.to_string()
        }
    }
}

/// Formats an ISO time of day, ignoring any UTC offset
pub fn format_time(raw: &str) -> String {
    match parse_time(raw) {
        Some(time) => time.format(TIME_FORMAT).to_string(),
        None => {
            tracing::debug!(value = raw, "Unparseable time value, keeping raw text");
            raw.to_string()
        }
    }
}

/// Formats an ISO datetime after converting it to UTC
pub fn format_datetime(raw: &str) -> String {
    match parse_datetime(raw) {
        Some(datetime) => format_utc(&datetime.with_timezone(&Utc)),
        None => {
            tracing::debug!(value = raw, "Unparseable datetime value, keeping raw text");
            raw.to_string()
        }
    }
}

/// Formats a UTC instant
pub fn format_utc(datetime: &DateTime<Utc>) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

/// Parses the leading `YYYY-MM-DD` of a value
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Parses an offset-aware time of day, dropping the offset
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let local = strip_offset(raw.trim());
    local
        .parse::<NaiveTime>()
        .ok()
        .or_else(|| NaiveTime::parse_from_str(local, "%H:%M").ok())
}

/// Parses an RFC 3339 datetime, tolerating offsets without a colon
///
/// A datetime without any offset is taken to be UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc().fixed_offset())
        })
}

fn strip_offset(raw: &str) -> &str {
    if let Some(stripped) = raw.strip_suffix('Z') {
        return stripped;
    }
    match raw.rfind(['+', '-']) {
        Some(pos) if pos > 0 => &raw[..pos],
        _ => raw,
    }
}
