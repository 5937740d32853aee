//! Tests for station masking.

use analysis_sync::mask::{latest_per_station, mask, within_box};
use chrono::Duration;
use test_utils::{paired_stations, regions, repeated_reports, station, station_line, test_instant};
use wx_common::StationReport;

fn ids(stations: &[StationReport]) -> Vec<&str> {
    stations.iter().map(|s| s.id.as_str()).collect()
}

/// Stations scattered over California on a deterministic pseudo-random walk.
fn scattered(count: usize) -> Vec<StationReport> {
    let mut h: u32 = 2166136261;
    (0..count)
        .map(|i| {
            h = h.wrapping_mul(16777619) ^ i as u32;
            let lat = 32.0 + (h % 10_000) as f64 / 1000.0;
            h = h.wrapping_mul(16777619) ^ 0x9e37;
            let lon = -125.0 + (h % 11_000) as f64 / 1000.0;
            station(&format!("K{i:03}"), lat, lon, test_instant())
        })
        .collect()
}

// ============================================================================
// Separation invariant
// ============================================================================

#[test]
fn test_retained_pairs_exceed_radius() {
    for radius in [10.0, 50.0, 120.0, 400.0] {
        let kept = mask(scattered(300), radius);
        assert!(!kept.is_empty());
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                assert!(
                    a.distance_km(b) > radius,
                    "{} and {} are {:.1} km apart at radius {}",
                    a.id,
                    b.id,
                    a.distance_km(b),
                    radius
                );
            }
        }
    }
}

#[test]
fn test_mask_keeps_input_order_and_is_stable() {
    let input = scattered(200);
    let first = mask(input.clone(), 75.0);
    let second = mask(input.clone(), 75.0);
    assert_eq!(ids(&first), ids(&second));

    // Retained ids appear in the same relative order as in the input.
    let positions: Vec<usize> = first
        .iter()
        .map(|k| input.iter().position(|s| s.id == k.id).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_larger_radius_keeps_fewer() {
    let small = mask(scattered(200), 25.0).len();
    let large = mask(scattered(200), 250.0).len();
    assert!(large <= small);
}

#[test]
fn test_mask_empty_input() {
    assert!(mask(Vec::new(), 50.0).is_empty());
}

#[test]
fn test_widely_spaced_line_untouched() {
    // One degree of longitude on the equator is about 111 km.
    let line = station_line(10, 0.0, -10.0, 1.0, test_instant());
    assert_eq!(mask(line, 100.0).len(), 10);
}

// ============================================================================
// Paired-station scenario
// ============================================================================

#[test]
fn test_two_close_pairs_and_one_isolated() {
    let kept = mask(paired_stations(test_instant()), 50.0);
    assert_eq!(ids(&kept), vec!["A1", "B1", "ISO"]);
}

// ============================================================================
// Box filter and de-duplication
// ============================================================================

#[test]
fn test_within_box_preserves_order() {
    let stations = vec![
        station("KSFO", 37.62, -122.37, test_instant()),
        station("KDEN", 39.86, -104.67, test_instant()),
        station("KLAX", 33.94, -118.41, test_instant()),
    ];
    let kept = within_box(stations, &regions::CALIFORNIA);
    assert_eq!(ids(&kept), vec!["KSFO", "KLAX"]);
}

#[test]
fn test_latest_per_station_prefers_report_nearest_valid_time() {
    let mut reports = repeated_reports("KSFO", 3, test_instant(), Duration::minutes(20));
    reports.insert(1, station("KOAK", 37.72, -122.22, test_instant()));

    let deduped = latest_per_station(reports, &test_instant());
    assert_eq!(ids(&deduped), vec!["KSFO", "KOAK"]);
    assert_eq!(deduped[0].report_time, test_instant());
}
