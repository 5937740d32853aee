//! Point surface observations (METAR-style station reports).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::Units;

/// Well-known measurement names used by station sources.
pub mod fields {
    pub const TEMPERATURE: &str = "temperature";
    pub const DEWPOINT: &str = "dewpoint";
    pub const WIND_DIRECTION: &str = "wind_direction";
    pub const WIND_SPEED: &str = "wind_speed";
    pub const WIND_GUST: &str = "wind_gust";
    pub const U_WIND: &str = "u_wind";
    pub const V_WIND: &str = "v_wind";
    pub const ALTIMETER: &str = "altimeter";
    pub const SEA_LEVEL_PRESSURE: &str = "sea_level_pressure";
    pub const VISIBILITY: &str = "visibility";

    /// Fields that only matter when wind vectors are drawn.
    pub const VECTOR_FIELDS: &[&str] = &[WIND_DIRECTION, WIND_SPEED, WIND_GUST, U_WIND, V_WIND];

    pub fn is_vector_field(name: &str) -> bool {
        VECTOR_FIELDS.contains(&name)
    }
}

/// A single measured value with its unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub units: Units,
}

impl Measurement {
    pub fn new(value: f64, units: Units) -> Self {
        Self { value, units }
    }
}

/// One observation from one station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReport {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub fields: BTreeMap<String, Measurement>,
    pub report_time: DateTime<Utc>,
}

impl StationReport {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64, report_time: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            fields: BTreeMap::new(),
            report_time,
        }
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, name: &str, value: f64, units: Units) -> Self {
        self.fields.insert(name.to_string(), Measurement::new(value, units));
        self
    }

    pub fn field(&self, name: &str) -> Option<&Measurement> {
        self.fields.get(name)
    }

    pub fn has_location(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
    }

    pub fn distance_km(&self, other: &StationReport) -> f64 {
        crate::haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}
