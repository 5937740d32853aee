//! Data acquisition with a caller-data preference and a single retry.
//!
//! ```text
//! UseSupplied --valid--> Done
//!      |
//!   invalid (warn)
//!      v
//! FetchFresh(1) --ok--> Done
//!      |
//!   transient failure (warn, wait)
//!      v
//! FetchFresh(2) --ok--> Done
//!      |
//!   failure
//!      v
//!   Failed --> DataUnavailable
//! ```
//!
//! Permanent failures (`FieldNotFound`, `InvalidExtent`, configuration) leave
//! the machine immediately without a retry.

use chrono::Duration as ChronoDuration;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use wx_common::{
    BoundingBox, FieldSet, GridBundle, ResolvedTimes, StationReport, ValidTime, WxError, WxResult,
};

use crate::fetch::GridSource;
use crate::request::ProductKind;
use crate::resolver::COMPARISON_LAG_HOURS;
use crate::stations::StationSource;

/// Fresh fetch attempts before giving up: the first try plus one retry.
pub const MAX_FETCH_ATTEMPTS: u32 = 2;

/// Where a bundle's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleSource {
    Supplied,
    Fetched,
}

/// Pre-fetched data a caller hands in instead of having it downloaded.
///
/// Used all-or-nothing: if any part fails validation, none of it is used.
#[derive(Debug, Clone, Default)]
pub struct SuppliedData {
    pub grid: Option<GridBundle>,
    pub comparison: Option<GridBundle>,
    pub stations: Option<Vec<StationReport>>,
    /// The times the data was resolved for.
    pub times: Option<ResolvedTimes>,
}

/// What to acquire.
#[derive(Debug, Clone)]
pub struct AcquirePlan {
    pub kind: ProductKind,
    pub fields: FieldSet,
    pub bbox: BoundingBox,
    pub times: ResolvedTimes,
}

/// Acquired, not yet masked or decimated, data.
#[derive(Debug, Clone)]
pub struct Acquired {
    pub grid: GridBundle,
    pub comparison: Option<GridBundle>,
    pub stations: Option<Vec<StationReport>>,
    /// Valid times of the data actually acquired.
    pub times: ResolvedTimes,
    pub source: BundleSource,
}

enum AcquireState {
    UseSupplied(SuppliedData),
    FetchFresh { attempt: u32 },
    Done(Acquired),
    Failed(WxError),
}

pub struct RetryingAcquirer<G, S> {
    grids: G,
    stations: S,
    retry_delay: Duration,
}

impl<G: GridSource, S: StationSource> RetryingAcquirer<G, S> {
    pub fn new(grids: G, stations: S, retry_delay: Duration) -> Self {
        Self {
            grids,
            stations,
            retry_delay,
        }
    }

    pub fn grid_source(&self) -> &G {
        &self.grids
    }

    pub fn station_source(&self) -> &S {
        &self.stations
    }

    /// Run the acquisition state machine to completion.
    pub fn acquire(&self, supplied: Option<SuppliedData>, plan: &AcquirePlan) -> WxResult<Acquired> {
        let mut state = match supplied {
            Some(data) => AcquireState::UseSupplied(data),
            None => AcquireState::FetchFresh { attempt: 1 },
        };

        loop {
            state = match state {
                AcquireState::UseSupplied(data) => match validate_supplied(data, plan) {
                    Ok(acquired) => {
                        debug!(kind = ?plan.kind, "Using supplied data");
                        AcquireState::Done(acquired)
                    }
                    Err(reason) => {
                        warn!(
                            kind = ?plan.kind,
                            reason = %reason,
                            "Supplied data rejected, fetching fresh"
                        );
                        AcquireState::FetchFresh { attempt: 1 }
                    }
                },

                AcquireState::FetchFresh { attempt } => match self.fetch_fresh(plan) {
                    Ok(acquired) => {
                        info!(
                            kind = ?plan.kind,
                            attempt = attempt,
                            valid_time = %acquired.grid.valid_time.utc_label(),
                            "Acquired fresh data"
                        );
                        AcquireState::Done(acquired)
                    }
                    Err(e) if !e.is_transient() => return Err(e),
                    Err(e) if attempt < MAX_FETCH_ATTEMPTS => {
                        warn!(
                            error = %e,
                            attempt = attempt,
                            delay_secs = self.retry_delay.as_secs(),
                            "Fetch failed, retrying"
                        );
                        if !self.retry_delay.is_zero() {
                            std::thread::sleep(self.retry_delay);
                        }
                        AcquireState::FetchFresh {
                            attempt: attempt + 1,
                        }
                    }
                    Err(e) => AcquireState::Failed(e),
                },

                AcquireState::Done(acquired) => return Ok(acquired),

                AcquireState::Failed(cause) => {
                    error!(error = %cause, attempts = MAX_FETCH_ATTEMPTS, "Fetch failed");
                    return Err(WxError::DataUnavailable(format!(
                        "{} for {} after {} attempts: {}",
                        describe_fields(&plan.fields),
                        plan.times.current().utc_label(),
                        MAX_FETCH_ATTEMPTS,
                        cause
                    )));
                }
            };
        }
    }

    /// One complete fetch: grid, then comparison grid and stations as needed.
    fn fetch_fresh(&self, plan: &AcquirePlan) -> WxResult<Acquired> {
        let grid = self
            .grids
            .fetch(&plan.fields, plan.times.current(), &plan.bbox)?;

        // Keyed off the fetched grid, which may be an earlier published
        // analysis than the one resolved
        let comparison = if plan.kind.needs_comparison() {
            let previous = comparison_time(&grid.valid_time);
            let bundle = self.grids.fetch(&plan.fields, &previous, &plan.bbox)?;
            if bundle.valid_time.utc != previous.utc {
                return Err(WxError::DataUnavailable(format!(
                    "comparison analysis for {} not published, nearest is {}",
                    previous.utc_label(),
                    bundle.valid_time.utc_label()
                )));
            }
            Some(bundle)
        } else {
            None
        };

        let stations = if plan.kind.needs_stations() {
            Some(self.stations.fetch_stations(&grid.valid_time, &plan.bbox)?)
        } else {
            None
        };

        let times = times_of(&grid, comparison.as_ref());
        Ok(Acquired {
            grid,
            comparison,
            stations,
            times,
            source: BundleSource::Fetched,
        })
    }
}

/// The valid time a comparison grid must have for `current`.
fn comparison_time(current: &ValidTime) -> ValidTime {
    current.shifted(ChronoDuration::hours(-COMPARISON_LAG_HOURS))
}

fn times_of(grid: &GridBundle, comparison: Option<&GridBundle>) -> ResolvedTimes {
    match comparison {
        Some(previous) => ResolvedTimes::Pair {
            current: grid.valid_time,
            previous: previous.valid_time,
        },
        None => ResolvedTimes::Single(grid.valid_time),
    }
}

fn describe_fields(fields: &FieldSet) -> String {
    fields.iter().cloned().collect::<Vec<_>>().join(",")
}

/// Check supplied data against the plan. On success the data is used as is.
pub fn validate_supplied(data: SuppliedData, plan: &AcquirePlan) -> Result<Acquired, String> {
    let times = data.times.ok_or("no time metadata supplied")?;
    match (plan.kind.needs_comparison(), times.is_pair()) {
        (true, false) => return Err("comparison product needs a time pair".into()),
        (false, true) => return Err("single-time product supplied with a time pair".into()),
        _ => {}
    }
    if let Some(previous) = times.previous() {
        let expected = comparison_time(times.current());
        if previous.utc != expected.utc {
            return Err(format!(
                "time pair {} / {} is not {} h apart",
                times.current().utc_label(),
                previous.utc_label(),
                COMPARISON_LAG_HOURS
            ));
        }
    }

    let grid = data.grid.ok_or("no grid supplied")?;
    check_bundle(&grid, &plan.fields, times.current(), "grid")?;

    let comparison = if plan.kind.needs_comparison() {
        let comparison = data.comparison.ok_or("no comparison grid supplied")?;
        let previous = times.previous().ok_or("no previous time supplied")?;
        check_bundle(&comparison, &plan.fields, previous, "comparison grid")?;
        Some(comparison)
    } else {
        None
    };

    let stations = if plan.kind.needs_stations() {
        Some(data.stations.ok_or("no stations supplied")?)
    } else {
        None
    };

    Ok(Acquired {
        grid,
        comparison,
        stations,
        times,
        source: BundleSource::Supplied,
    })
}

fn check_bundle(
    bundle: &GridBundle,
    fields: &FieldSet,
    expected: &ValidTime,
    what: &str,
) -> Result<(), String> {
    if let Some(missing) = bundle.first_missing(fields) {
        return Err(format!("{what} is missing field '{missing}'"));
    }
    if bundle.valid_time.utc != expected.utc {
        return Err(format!(
            "{what} is valid at {}, metadata says {}",
            bundle.valid_time.utc_label(),
            expected.utc_label()
        ));
    }
    for grid in bundle.grids() {
        if !grid.is_consistent() {
            return Err(format!("{what} field '{}' has an inconsistent shape", grid.field_name));
        }
        if grid.valid_time.utc != bundle.valid_time.utc {
            return Err(format!(
                "{what} field '{}' is valid at {}",
                grid.field_name,
                grid.valid_time.utc_label()
            ));
        }
    }
    Ok(())
}
