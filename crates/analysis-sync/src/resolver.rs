//! Valid-time resolution.
//!
//! Analyses are published on a fixed cadence some time after their valid
//! time. The resolver picks the newest one that should exist at `now`, and
//! for comparison products the one exactly [`COMPARISON_LAG_HOURS`] earlier.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use wx_common::{ResolvedTimes, ValidTime};

use crate::config::SyncConfig;
use crate::request::ProductKind;

/// Offset between the two analyses of a comparison product.
pub const COMPARISON_LAG_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy)]
pub struct TimeResolver {
    zone: Tz,
    cadence: Duration,
    publish_delay: Duration,
}

impl TimeResolver {
    pub fn new(zone: Tz, cadence: Duration, publish_delay: Duration) -> Self {
        Self {
            zone,
            cadence,
            publish_delay,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.display_timezone,
            Duration::minutes(config.schedule.cadence_minutes as i64),
            Duration::minutes(config.schedule.publish_delay_minutes as i64),
        )
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Newest analysis valid time published by `now`.
    pub fn resolve_latest(&self, now: DateTime<Utc>) -> ValidTime {
        let ready = now - self.publish_delay;
        let cadence = self.cadence.num_seconds().max(1);
        let ts = ready.timestamp();
        let floored = ts - ts.rem_euclid(cadence);
        let utc = DateTime::from_timestamp(floored, 0).unwrap_or(ready);
        self.to_valid_time(utc)
    }

    /// Latest valid time and the one a fixed lag earlier.
    ///
    /// Both are converted to the display zone independently, so across a DST
    /// transition the local labels differ by 23 or 25 hours while the UTC
    /// instants stay exactly 24 hours apart.
    pub fn resolve_pair(&self, now: DateTime<Utc>) -> (ValidTime, ValidTime) {
        let current = self.resolve_latest(now);
        let previous = self.to_valid_time(current.utc - Duration::hours(COMPARISON_LAG_HOURS));
        (current, previous)
    }

    pub fn to_valid_time(&self, utc: DateTime<Utc>) -> ValidTime {
        ValidTime::new(utc, self.zone)
    }

    pub fn resolve(&self, now: DateTime<Utc>, kind: ProductKind) -> ResolvedTimes {
        if kind.needs_comparison() {
            let (current, previous) = self.resolve_pair(now);
            ResolvedTimes::Pair { current, previous }
        } else {
            ResolvedTimes::Single(self.resolve_latest(now))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn hourly(zone: Tz) -> TimeResolver {
        TimeResolver::new(zone, Duration::hours(1), Duration::zero())
    }

    #[test]
    fn test_latest_floors_to_cadence() {
        let resolver = hourly(chrono_tz::UTC);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 14, 47, 12).unwrap();
        let vt = resolver.resolve_latest(now);
        assert_eq!(vt.utc, Utc.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_latest_applies_publish_delay() {
        let resolver = TimeResolver::new(chrono_tz::UTC, Duration::hours(1), Duration::minutes(50));
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 14, 20, 0).unwrap();
        assert_eq!(resolver.resolve_latest(now).utc.hour(), 13);
    }

    #[test]
    fn test_latest_on_boundary() {
        let resolver = hourly(chrono_tz::UTC);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap();
        assert_eq!(resolver.resolve_latest(now).utc, now);
    }

    #[test]
    fn test_pair_is_exactly_one_day_apart() {
        let resolver = hourly(chrono_tz::America::Chicago);
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 30, 0).unwrap();
        let (current, previous) = resolver.resolve_pair(now);
        assert_eq!((current.utc - previous.utc).num_seconds(), 86_400);
        // Clocks sprang forward in between, so the local labels read 25 hours apart.
        let local_gap = current.local.naive_local() - previous.local.naive_local();
        assert_eq!(local_gap.num_hours(), 25);
    }

    #[test]
    fn test_resolve_by_kind() {
        let resolver = hourly(chrono_tz::UTC);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap();
        assert!(!resolver.resolve(now, ProductKind::Analysis).is_pair());
        assert!(!resolver.resolve(now, ProductKind::StationOverlay).is_pair());
        assert!(resolver.resolve(now, ProductKind::Comparison).is_pair());
    }
}
