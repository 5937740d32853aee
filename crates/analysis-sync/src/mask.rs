//! Station thinning so plotted reports do not overlap.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use wx_common::{BoundingBox, StationReport};

/// Greedy minimum-separation filter.
///
/// Stations are visited in input order; one is kept only if its great-circle
/// distance to every station kept so far exceeds `min_separation_km`.
/// Reports without a usable location are dropped.
pub fn mask(stations: Vec<StationReport>, min_separation_km: f64) -> Vec<StationReport> {
    let min_separation_km = if min_separation_km.is_finite() {
        min_separation_km.max(0.0)
    } else {
        warn!(radius_km = min_separation_km, "Non-finite mask radius, using 0");
        0.0
    };

    let input = stations.len();
    let mut kept: Vec<StationReport> = Vec::with_capacity(input);
    for station in stations {
        if !station.has_location() {
            warn!(
                station = %station.id,
                latitude = station.latitude,
                longitude = station.longitude,
                "Dropping station without a usable location"
            );
            continue;
        }
        if kept
            .iter()
            .all(|k| k.distance_km(&station) > min_separation_km)
        {
            kept.push(station);
        }
    }

    debug!(
        input = input,
        kept = kept.len(),
        radius_km = min_separation_km,
        "Masked stations"
    );
    kept
}

/// Keep stations inside `bbox`, preserving order.
pub fn within_box(stations: Vec<StationReport>, bbox: &BoundingBox) -> Vec<StationReport> {
    stations
        .into_iter()
        .filter(|s| s.has_location() && bbox.contains(s.latitude, s.longitude))
        .collect()
}

/// Collapse repeated reports from one station to the one closest to `target`.
///
/// Output order follows each station's first appearance in the input.
pub fn latest_per_station(
    stations: Vec<StationReport>,
    target: &DateTime<Utc>,
) -> Vec<StationReport> {
    let gap = |s: &StationReport| (s.report_time - *target).num_seconds().abs();

    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<StationReport> = Vec::with_capacity(stations.len());
    for station in stations {
        match slots.get(&station.id) {
            Some(&i) => {
                if gap(&station) < gap(&out[i]) {
                    out[i] = station;
                }
            }
            None => {
                slots.insert(station.id.clone(), out.len());
                out.push(station);
            }
        }
    }
    out
}
