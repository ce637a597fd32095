//! Timestamp helpers
//!
//! The HTTP boundary speaks ISO-8601; metadata rows and storage keys use unix
//! seconds. Conversions live here so the boundary is crossed in one place.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid timestamp: {0}")]
pub struct TimestampError(pub String);

/// Parse an ISO-8601 instant into unix seconds.
///
/// Accepts full RFC 3339 ("2025-05-19T14:20:00Z", "...+02:00"), a naive
/// instant (treated as UTC), and a bare short offset suffix without minutes
/// ("...T14:20:00-03") as emitted by the upstream simulator.
pub fn iso_to_unix(timestamp: &str) -> Result<i64, TimestampError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Ok(dt.timestamp());
    }

    let naive = strip_short_offset(timestamp);
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|_| TimestampError(timestamp.to_string()))
}

/// Render unix seconds back as an ISO-8601 UTC instant ("2025-05-19T14:20:00Z").
///
/// Returns `None` for instants outside chrono's representable range.
pub fn unix_to_iso(secs: i64) -> Option<String> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Milliseconds since the epoch, for row bookkeeping
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Drop a trailing "+HH"/"-HH" offset that carries no minutes part, which
/// RFC 3339 parsing rejects.
fn strip_short_offset(timestamp: &str) -> &str {
    let bytes = timestamp.as_bytes();
    if bytes.len() > 3
        && matches!(bytes[bytes.len() - 3], b'+' | b'-')
        && bytes[bytes.len() - 2].is_ascii_digit()
        && bytes[bytes.len() - 1].is_ascii_digit()
    {
        return &timestamp[..timestamp.len() - 3];
    }
    timestamp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_utc() {
        assert_eq!(iso_to_unix("2025-05-19T14:20:00Z").unwrap(), 1747664400);
    }

    #[test]
    fn parses_naive_as_utc() {
        assert_eq!(iso_to_unix("2025-05-19T14:20:00").unwrap(), 1747664400);
    }

    #[test]
    fn parses_short_offset_by_dropping_it() {
        // "-03" has no minutes part, so it is treated as a naive UTC instant
        assert_eq!(iso_to_unix("2025-05-19T14:20:00-03").unwrap(), 1747664400);
    }

    #[test]
    fn rejects_garbage() {
        assert!(iso_to_unix("not-a-timestamp").is_err());
        assert!(iso_to_unix("").is_err());
    }

    #[test]
    fn round_trips_through_unix() {
        let unix = iso_to_unix("2025-05-19T14:20:00Z").unwrap();
        assert_eq!(unix_to_iso(unix).unwrap(), "2025-05-19T14:20:00Z");
    }
}
