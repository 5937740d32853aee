//! Tests for the retrying acquirer.

mod common;

use std::time::Duration;

use analysis_sync::acquire::{AcquirePlan, BundleSource, RetryingAcquirer, SuppliedData};
use analysis_sync::ProductKind;
use chrono::Duration as ChronoDuration;
use common::{MockGrids, MockStations};
use test_utils::{grid_bundle, paired_stations, regions, test_instant, valid_time_at};
use wx_common::{FieldSet, ResolvedTimes, ValidTime, WxError};

fn now() -> ValidTime {
    valid_time_at(test_instant(), chrono_tz::America::Los_Angeles)
}

fn fields() -> FieldSet {
    ["TMP", "DPT"].iter().map(|s| s.to_string()).collect()
}

fn plan(kind: ProductKind) -> AcquirePlan {
    let current = now();
    let times = match kind {
        ProductKind::Comparison => ResolvedTimes::Pair {
            current,
            previous: current.shifted(ChronoDuration::hours(-24)),
        },
        _ => ResolvedTimes::Single(current),
    };
    AcquirePlan {
        kind,
        fields: fields(),
        bbox: regions::CALIFORNIA,
        times,
    }
}

fn new_acquirer(grids: MockGrids, stations: MockStations) -> RetryingAcquirer<MockGrids, MockStations> {
    RetryingAcquirer::new(grids, stations, Duration::ZERO)
}

fn transport() -> WxError {
    WxError::Transport("connection reset".into())
}

fn truncated() -> WxError {
    WxError::Decode("truncated body".into())
}

fn unpublished() -> WxError {
    WxError::DataUnavailable("not published".into())
}

fn missing_dewpoint() -> WxError {
    WxError::field_not_found("DPT", "2024-06-01T12:00Z")
}

fn inverted() -> WxError {
    WxError::InvalidExtent("inverted".into())
}

// ============================================================================
// Fresh fetch and retry
// ============================================================================

#[test]
fn test_fresh_fetch_first_try() {
    let acquirer = new_acquirer(MockGrids::healthy(), MockStations::empty());
    let acquired = acquirer.acquire(None, &plan(ProductKind::Analysis)).unwrap();
    assert_eq!(acquired.source, BundleSource::Fetched);
    assert_eq!(acquirer.grid_source().calls.get(), 1);
    assert!(acquired.stations.is_none());
    assert!(acquired.comparison.is_none());
}

#[test]
fn test_one_failure_absorbed_by_retry() {
    let acquirer = new_acquirer(MockGrids::failing(1, transport), MockStations::empty());
    let acquired = acquirer.acquire(None, &plan(ProductKind::Analysis)).unwrap();
    assert_eq!(acquired.source, BundleSource::Fetched);
    assert_eq!(acquirer.grid_source().calls.get(), 2);
}

#[test]
fn test_two_failures_yield_data_unavailable() {
    let errors: [fn() -> WxError; 3] = [transport, truncated, unpublished];
    for error in errors {
        let acq = new_acquirer(MockGrids::failing(2, error), MockStations::empty());
        let result = acq.acquire(None, &plan(ProductKind::Analysis));
        match result {
            Err(WxError::DataUnavailable(msg)) => assert!(msg.contains("after 2 attempts"), "{msg}"),
            other => panic!("Expected DataUnavailable, got {other:?}"),
        }
        assert_eq!(acq.grid_source().calls.get(), 2, "no third attempt");
    }
}

#[test]
fn test_permanent_errors_not_retried() {
    let errors: [fn() -> WxError; 2] = [missing_dewpoint, inverted];
    for error in errors {
        let acq = new_acquirer(MockGrids::failing(5, error), MockStations::empty());
        let result = acq.acquire(None, &plan(ProductKind::Analysis));
        assert!(matches!(
            result,
            Err(WxError::FieldNotFound { .. }) | Err(WxError::InvalidExtent(_))
        ));
        assert_eq!(acq.grid_source().calls.get(), 1);
    }
}

#[test]
fn test_retry_repeats_whole_fetch() {
    // First comparison fetch fails on the current grid; the retry fetches
    // both times again.
    let acquirer = new_acquirer(MockGrids::failing(1, transport), MockStations::empty());
    let acquired = acquirer.acquire(None, &plan(ProductKind::Comparison)).unwrap();
    assert_eq!(acquirer.grid_source().calls.get(), 3);

    let requested = acquirer.grid_source().requested.borrow();
    assert_eq!(requested[0].utc, requested[1].utc);
    assert_eq!((requested[1].utc - requested[2].utc).num_hours(), 24);
    assert!(acquired.comparison.is_some());
}

#[test]
fn test_overlay_fetches_stations_for_grid_time() {
    let acquirer = new_acquirer(
        MockGrids::healthy(),
        MockStations::new(paired_stations(test_instant())),
    );
    let acquired = acquirer.acquire(None, &plan(ProductKind::StationOverlay)).unwrap();
    assert_eq!(acquirer.station_source().calls.get(), 1);
    assert_eq!(acquired.stations.unwrap().len(), 5);
}

// ============================================================================
// Supplied data
// ============================================================================

#[test]
fn test_valid_supplied_data_used_without_fetch() {
    let acquirer = new_acquirer(MockGrids::healthy(), MockStations::empty());
    let supplied = SuppliedData {
        grid: Some(grid_bundle(&["TMP", "DPT"], &regions::CALIFORNIA, now())),
        times: Some(ResolvedTimes::Single(now())),
        ..Default::default()
    };
    let acquired = acquirer
        .acquire(Some(supplied), &plan(ProductKind::Analysis))
        .unwrap();
    assert_eq!(acquired.source, BundleSource::Supplied);
    assert_eq!(acquirer.grid_source().calls.get(), 0);
}

#[test]
fn test_invalid_supplied_triggers_exactly_one_fetch() {
    let acquirer = new_acquirer(MockGrids::healthy(), MockStations::empty());
    let supplied = SuppliedData {
        grid: Some(grid_bundle(&["TMP"], &regions::CALIFORNIA, now())),
        times: Some(ResolvedTimes::Single(now())),
        ..Default::default()
    };
    let acquired = acquirer
        .acquire(Some(supplied), &plan(ProductKind::Analysis))
        .unwrap();
    assert_eq!(acquired.source, BundleSource::Fetched);
    assert_eq!(acquirer.grid_source().calls.get(), 1);
}

#[test]
fn test_invalid_supplied_then_failing_fetch() {
    let acquirer = new_acquirer(MockGrids::failing(2, transport), MockStations::empty());
    let result = acquirer.acquire(Some(SuppliedData::default()), &plan(ProductKind::Analysis));
    assert!(matches!(result, Err(WxError::DataUnavailable(_))));
    assert_eq!(acquirer.grid_source().calls.get(), 2);
}

#[test]
fn test_malformed_supplied_does_not_leak() {
    // Supplied stations are fine but the grid lacks DPT: nothing supplied
    // may survive into the result.
    let acquirer = new_acquirer(MockGrids::healthy(), MockStations::empty());
    let supplied = SuppliedData {
        grid: Some(grid_bundle(&["TMP"], &regions::CALIFORNIA, now())),
        stations: Some(paired_stations(test_instant())),
        times: Some(ResolvedTimes::Single(now())),
        ..Default::default()
    };
    let acquired = acquirer
        .acquire(Some(supplied), &plan(ProductKind::StationOverlay))
        .unwrap();

    assert_eq!(acquired.source, BundleSource::Fetched);
    assert_eq!(acquirer.grid_source().calls.get(), 1);
    assert_eq!(acquirer.station_source().calls.get(), 1);
    assert!(acquired.stations.unwrap().is_empty());
    assert!(acquired.grid.get("DPT").is_some());
}

#[test]
fn test_comparison_supplied_needs_pair() {
    let acquirer = new_acquirer(MockGrids::healthy(), MockStations::empty());
    let current = now();
    let supplied = SuppliedData {
        grid: Some(grid_bundle(&["TMP", "DPT"], &regions::CALIFORNIA, current)),
        comparison: Some(grid_bundle(
            &["TMP", "DPT"],
            &regions::CALIFORNIA,
            current.shifted(ChronoDuration::hours(-24)),
        )),
        times: Some(ResolvedTimes::Single(current)),
        ..Default::default()
    };
    let acquired = acquirer
        .acquire(Some(supplied), &plan(ProductKind::Comparison))
        .unwrap();
    assert_eq!(acquired.source, BundleSource::Fetched);
    assert_eq!(acquirer.grid_source().calls.get(), 2);
}

#[test]
fn test_supplied_pair_not_a_day_apart_refetched() {
    let acquirer = new_acquirer(MockGrids::healthy(), MockStations::empty());
    let current = now();
    let previous = current.shifted(ChronoDuration::hours(-5));
    let supplied = SuppliedData {
        grid: Some(grid_bundle(&["TMP", "DPT"], &regions::CALIFORNIA, current)),
        comparison: Some(grid_bundle(&["TMP", "DPT"], &regions::CALIFORNIA, previous)),
        times: Some(ResolvedTimes::Pair { current, previous }),
        ..Default::default()
    };
    let acquired = acquirer
        .acquire(Some(supplied), &plan(ProductKind::Comparison))
        .unwrap();

    assert_eq!(acquired.source, BundleSource::Fetched);
    assert_eq!(acquirer.grid_source().calls.get(), 2);
    let comparison = acquired.comparison.unwrap();
    assert_eq!((acquired.grid.valid_time.utc - comparison.valid_time.utc).num_hours(), 24);
}

#[test]
fn test_comparison_at_wrong_time_is_retried_then_unavailable() {
    // The day-earlier analysis is missing; its request snaps an hour off.
    let published = vec![test_instant() - ChronoDuration::hours(23), test_instant()];
    let acquirer = new_acquirer(MockGrids::snapping(published), MockStations::empty());
    let result = acquirer.acquire(None, &plan(ProductKind::Comparison));
    assert!(matches!(result, Err(WxError::DataUnavailable(_))));
    assert_eq!(acquirer.grid_source().calls.get(), 4);
}
