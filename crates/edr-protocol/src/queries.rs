//! Query parameters for EDR cube requests.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Bounding box query parameters (for area/cube queries).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BboxQuery {
    /// Western longitude.
    pub west: f64,

    /// Southern latitude.
    pub south: f64,

    /// Eastern longitude.
    pub east: f64,

    /// Northern latitude.
    pub north: f64,
}

impl BboxQuery {
    /// `west,south,east,north` as EDR expects it.
    pub fn to_param(&self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// A cube query for one instant and a set of parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeQuery {
    pub bbox: BboxQuery,
    pub datetime: DateTime<Utc>,
    pub parameter_names: Vec<String>,
    /// Output format, `CoverageJSON` unless overridden.
    pub format: String,
}

impl CubeQuery {
    pub fn new(bbox: BboxQuery, datetime: DateTime<Utc>, parameter_names: Vec<String>) -> Self {
        Self {
            bbox,
            datetime,
            parameter_names,
            format: "CoverageJSON".to_string(),
        }
    }

    /// Query string pairs for `GET /collections/{id}/cube`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("bbox", self.bbox.to_param()),
            (
                "datetime",
                self.datetime.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("parameter-name", self.parameter_names.join(",")),
            ("f", self.format.clone()),
        ]
    }
}
