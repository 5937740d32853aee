//! Valid times for analyses and observations.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{WxError, WxResult};

/// The instant an analysis or observation describes, carried in both UTC and
/// the display zone.
///
/// Both fields always refer to the same instant; `local` is derived from
/// `utc` and never set independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidTime {
    pub utc: DateTime<Utc>,
    pub local: DateTime<Tz>,
}

impl ValidTime {
    pub fn new(utc: DateTime<Utc>, zone: Tz) -> Self {
        Self {
            utc,
            local: utc.with_timezone(&zone),
        }
    }

    /// Display zone of the local representation.
    pub fn zone(&self) -> Tz {
        self.local.timezone()
    }

    /// The same clock offset applied in UTC, re-derived in the same zone.
    pub fn shifted(&self, offset: Duration) -> Self {
        Self::new(self.utc + offset, self.zone())
    }

    /// Absolute distance to another instant.
    pub fn distance_to(&self, other: &DateTime<Utc>) -> Duration {
        let delta = self.utc - *other;
        if delta < Duration::zero() {
            -delta
        } else {
            delta
        }
    }

    pub fn utc_label(&self) -> String {
        self.utc.format("%Y-%m-%dT%H:%MZ").to_string()
    }

    pub fn local_label(&self) -> String {
        self.local.format("%Y-%m-%d %H:%M %Z").to_string()
    }

    /// Parse an ISO 8601 timestamp as published by catalogs and station feeds.
    pub fn parse_utc(s: &str) -> WxResult<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        // Without zone designator, with or without seconds (assume UTC)
        for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Utc.from_utc_datetime(&ndt));
            }
        }

        Err(WxError::Decode(format!("invalid timestamp '{s}'")))
    }
}

impl std::fmt::Display for ValidTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.utc_label(), self.local_label())
    }
}

/// The time(s) a product was resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTimes {
    /// Plain analysis or station overlay product.
    Single(ValidTime),
    /// Comparison product: the latest analysis and the one a fixed lag earlier.
    Pair {
        current: ValidTime,
        previous: ValidTime,
    },
}

impl ResolvedTimes {
    pub fn current(&self) -> &ValidTime {
        match self {
            ResolvedTimes::Single(t) => t,
            ResolvedTimes::Pair { current, .. } => current,
        }
    }

    pub fn previous(&self) -> Option<&ValidTime> {
        match self {
            ResolvedTimes::Single(_) => None,
            ResolvedTimes::Pair { previous, .. } => Some(previous),
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, ResolvedTimes::Pair { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_local_follows_utc() {
        let utc = Utc.with_ymd_and_hms(2024, 7, 1, 18, 0, 0).unwrap();
        let vt = ValidTime::new(utc, chrono_tz::America::Los_Angeles);
        assert_eq!(vt.local.hour(), 11);
        assert_eq!(vt.local.with_timezone(&Utc), vt.utc);
        assert_eq!(vt.local_label(), "2024-07-01 11:00 PDT");
    }

    #[test]
    fn test_shifted_keeps_zone() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let vt = ValidTime::new(utc, chrono_tz::America::Denver);
        let earlier = vt.shifted(Duration::hours(-24));
        assert_eq!(earlier.zone(), chrono_tz::America::Denver);
        assert_eq!((vt.utc - earlier.utc).num_seconds(), 86_400);
    }

    #[test]
    fn test_parse_utc_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(ValidTime::parse_utc("2024-01-15T12:00:00Z").unwrap(), expected);
        assert_eq!(ValidTime::parse_utc("2024-01-15T12:00:00").unwrap(), expected);
        assert_eq!(ValidTime::parse_utc("2024-01-15T12:00").unwrap(), expected);
        assert_eq!(ValidTime::parse_utc("2024-01-15 12:00:00").unwrap(), expected);
        assert!(ValidTime::parse_utc("yesterday").is_err());
    }

    #[test]
    fn test_resolved_times_accessors() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let current = ValidTime::new(utc, chrono_tz::UTC);
        let previous = current.shifted(Duration::hours(-24));

        let single = ResolvedTimes::Single(current);
        assert!(!single.is_pair());
        assert!(single.previous().is_none());

        let pair = ResolvedTimes::Pair { current, previous };
        assert!(pair.is_pair());
        assert_eq!(pair.current(), &current);
        assert_eq!(pair.previous(), Some(&previous));
    }
}
