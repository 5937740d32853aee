//! Common test utilities for analysis-sync tests
//!
//! Provides in-memory grid and station sources that count their calls and
//! can be told to fail a number of times first.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use analysis_sync::fetch::select_published;
use analysis_sync::{GridSource, StationSource, SyncConfig};
use chrono::{DateTime, Duration, Utc};
use edr_protocol::Availability;
use wx_common::{BoundingBox, FieldSet, GridBundle, StationReport, ValidTime, WxError, WxResult};

/// Grid source serving generated bundles.
pub struct MockGrids {
    pub calls: Cell<u32>,
    /// Calls that fail before the source starts answering.
    pub failures: Cell<u32>,
    pub error: fn() -> WxError,
    /// Valid times requested, in call order.
    pub requested: RefCell<Vec<ValidTime>>,
    /// When set, answers with the nearest published analysis instead of
    /// echoing the requested time.
    pub published: Option<Availability>,
}

impl MockGrids {
    pub fn healthy() -> Self {
        Self::failing(0, || WxError::Transport("connection reset".into()))
    }

    pub fn failing(failures: u32, error: fn() -> WxError) -> Self {
        Self {
            calls: Cell::new(0),
            failures: Cell::new(failures),
            error,
            requested: RefCell::new(Vec::new()),
            published: None,
        }
    }

    /// Serve only the analyses listed in `published`, snapping like the
    /// EDR source does.
    pub fn snapping(published: Vec<DateTime<Utc>>) -> Self {
        Self {
            published: Some(Availability::Discrete(published)),
            ..Self::healthy()
        }
    }
}

/// Hourly analyses from `first` through `last` inclusive, minus `gaps`.
pub fn hourly_catalog(
    first: DateTime<Utc>,
    last: DateTime<Utc>,
    gaps: &[DateTime<Utc>],
) -> Vec<DateTime<Utc>> {
    let mut hours = Vec::new();
    let mut t = first;
    while t <= last {
        if !gaps.contains(&t) {
            hours.push(t);
        }
        t += Duration::hours(1);
    }
    hours
}

impl GridSource for MockGrids {
    fn fetch(
        &self,
        fields: &FieldSet,
        valid_time: &ValidTime,
        bbox: &BoundingBox,
    ) -> WxResult<GridBundle> {
        self.calls.set(self.calls.get() + 1);
        self.requested.borrow_mut().push(*valid_time);
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Err((self.error)());
        }
        let served = match &self.published {
            Some(published) => {
                let at = select_published(published, valid_time.utc, Duration::minutes(90))?;
                valid_time.shifted(at - valid_time.utc)
            }
            None => *valid_time,
        };
        let names: Vec<&str> = fields.iter().map(String::as_str).collect();
        Ok(test_utils::grid_bundle(&names, bbox, served))
    }
}

/// Station source returning a fixed set of reports.
pub struct MockStations {
    pub calls: Cell<u32>,
    pub reports: Vec<StationReport>,
}

impl MockStations {
    pub fn new(reports: Vec<StationReport>) -> Self {
        Self {
            calls: Cell::new(0),
            reports,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl StationSource for MockStations {
    fn fetch_stations(
        &self,
        _valid_time: &ValidTime,
        _bbox: &BoundingBox,
    ) -> WxResult<Vec<StationReport>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.reports.clone())
    }
}

/// Configuration with two regions, an LA display zone and no retry delay.
pub fn test_config() -> SyncConfig {
    analysis_sync::parse_sync_config(test_utils::configs::REGIONS_YAML)
        .expect("fixture config is valid")
}
