//! Generators for synthetic grids and station reports.
//!
//! Everything here is deterministic so tests can assert exact values.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;

use wx_common::station::fields;
use wx_common::{AnalysisGrid, BoundingBox, GridBundle, StationReport, Units, ValidTime};

/// Creates a test grid with predictable values.
///
/// Each cell value is `col * 1000 + row`, row-major.
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0);
/// assert_eq!(grid[10], 1.0);
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Temperature-like values in Kelvin, 250K in one corner to 310K in the other.
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f32 / width.max(1) as f32;
            let y_factor = row as f32 / height.max(1) as f32;
            data.push(250.0 + (x_factor * 30.0) + (y_factor * 30.0));
        }
    }
    data
}

/// Grid of zeros with NaN at the given (col, row) positions.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// `n` evenly spaced coordinates from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// The instant most tests revolve around: 2024-06-01T12:00Z.
pub fn test_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn valid_time_at(utc: DateTime<Utc>, zone: Tz) -> ValidTime {
    ValidTime::new(utc, zone)
}

/// A `width` x `height` temperature grid covering `bbox`.
pub fn analysis_grid(
    field: &str,
    bbox: &BoundingBox,
    width: usize,
    height: usize,
    valid_time: ValidTime,
) -> AnalysisGrid {
    AnalysisGrid::new(
        field,
        create_temperature_grid(width, height),
        linspace(bbox.south, bbox.north, height),
        linspace(bbox.west, bbox.east, width),
        valid_time,
        Units::Kelvin,
    )
    .expect("generated grid is consistent")
}

/// A bundle with one 8x6 grid per field over `bbox`.
pub fn grid_bundle(fields: &[&str], bbox: &BoundingBox, valid_time: ValidTime) -> GridBundle {
    let mut bundle = GridBundle::new(valid_time);
    for field in fields {
        bundle
            .insert(analysis_grid(field, bbox, 8, 6, valid_time))
            .expect("generated grid shares the bundle time");
    }
    bundle
}

/// A station with temperature and wind, reported at `report_time`.
pub fn station(id: &str, latitude: f64, longitude: f64, report_time: DateTime<Utc>) -> StationReport {
    StationReport::new(id, latitude, longitude, report_time)
        .with_field(fields::TEMPERATURE, 20.0, Units::Celsius)
        .with_field(fields::WIND_DIRECTION, 270.0, Units::Degrees)
        .with_field(fields::WIND_SPEED, 10.0, Units::Knots)
}

/// Stations on a west-east line along `latitude`, `spacing_deg` apart.
pub fn station_line(
    count: usize,
    latitude: f64,
    start_longitude: f64,
    spacing_deg: f64,
    report_time: DateTime<Utc>,
) -> Vec<StationReport> {
    (0..count)
        .map(|i| {
            station(
                &format!("S{i:03}"),
                latitude,
                start_longitude + spacing_deg * i as f64,
                report_time,
            )
        })
        .collect()
}

/// Five equatorial stations: two pairs roughly 10 km apart and one station
/// more than 100 km from all others, interleaved as A1, B1, A2, ISO, B2.
pub fn paired_stations(report_time: DateTime<Utc>) -> Vec<StationReport> {
    vec![
        station("A1", 0.0, 0.0, report_time),
        station("B1", 0.0, 2.0, report_time),
        station("A2", 0.0, 0.09, report_time),
        station("ISO", 0.0, 1.0, report_time),
        station("B2", 0.0, 2.09, report_time),
    ]
}

/// `count` reports from one station, `step` apart, ending at `last`.
pub fn repeated_reports(
    id: &str,
    count: usize,
    last: DateTime<Utc>,
    step: Duration,
) -> Vec<StationReport> {
    (0..count)
        .rev()
        .map(|i| station(id, 10.0, 10.0, last - step * i as i32))
        .collect()
}
