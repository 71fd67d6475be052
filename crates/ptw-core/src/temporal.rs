//! # Temporal Types: UTC-Only Timestamps
//!
//! `Timestamp` is the only time type used for permit schedules and audit
//! stamps. It is UTC, truncated to whole seconds, and renders as
//! `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! Inputs with a timezone offset are converted to UTC at parse time. The
//! stored value never carries an offset, so two stamps for the same instant
//! always compare equal.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PermitError;

/// A UTC timestamp with seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 timestamp, converting any offset to UTC.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the `timestamp` field if the input
    /// is not valid RFC 3339.
    pub fn parse(s: &str) -> Result<Self, PermitError> {
        let dt = DateTime::parse_from_rfc3339(s.trim()).map_err(|e| {
            PermitError::validation("timestamp", format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// This instant shifted by `hours` (negative moves backwards).
    pub fn plus_hours(&self, hours: i64) -> Self {
        Self(self.0 + Duration::hours(hours))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO 8601 with Z suffix (e.g. `2026-10-19T08:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc
            .with_ymd_and_hms(2026, 10, 19, 6, 30, 45)
            .unwrap()
            .with_nanosecond(987_654_321)
            .unwrap();
        assert_eq!(Timestamp::from_utc(dt).to_iso8601(), "2026-10-19T06:30:45Z");
    }

    #[test]
    fn test_parse_converts_offset_to_utc() {
        let ts = Timestamp::parse("2026-10-19T14:00:00+05:30").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-10-19T08:30:00Z");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = Timestamp::parse("tomorrow morning").unwrap_err();
        assert!(matches!(err, PermitError::Validation { ref field, .. } if field == "timestamp"));
        assert!(Timestamp::parse("2026-10-19").is_err());
    }

    #[test]
    fn test_plus_hours_orders_after() {
        let start = Timestamp::parse("2026-10-19T08:00:00Z").unwrap();
        let end = start.plus_hours(4);
        assert!(end > start);
        assert_eq!(end.to_iso8601(), "2026-10-19T12:00:00Z");
    }

    #[test]
    fn test_serde_roundtrip() {
        let ts = Timestamp::parse("2026-10-19T08:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }
}
