//! Collection extents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CovJsonError, CovJsonResult};

/// The extent of a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Extent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial: Option<SpatialExtent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalExtent>,
}

/// Spatial extent with bounding box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpatialExtent {
    /// Bounding boxes as [west, south, east, north] arrays.
    pub bbox: Vec<Vec<f64>>,

    #[serde(default = "default_crs")]
    pub crs: String,
}

fn default_crs() -> String {
    "CRS:84".to_string()
}

/// Temporal extent with time intervals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemporalExtent {
    /// Time intervals as [start, end] pairs; null means open-ended.
    #[serde(default)]
    pub interval: Vec<Vec<Option<String>>>,

    /// Discrete published times, when the catalog lists them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

/// What a temporal extent says about published analysis times.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    /// Only these instants exist.
    Discrete(Vec<DateTime<Utc>>),
    /// Anything in the closed range exists; an open end is unbounded.
    Interval {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
}

impl TemporalExtent {
    /// Interpret the extent, preferring the discrete value list.
    pub fn availability(&self) -> CovJsonResult<Availability> {
        if let Some(values) = &self.values {
            let mut times = values
                .iter()
                .map(|v| parse_time(v))
                .collect::<CovJsonResult<Vec<_>>>()?;
            times.sort();
            return Ok(Availability::Discrete(times));
        }

        let first = self
            .interval
            .first()
            .ok_or_else(|| CovJsonError::InvalidExtent("temporal extent has no interval".into()))?;
        let bound = |i: usize| -> CovJsonResult<Option<DateTime<Utc>>> {
            match first.get(i).and_then(|v| v.as_deref()) {
                Some(s) => parse_time(s).map(Some),
                None => Ok(None),
            }
        };

        Ok(Availability::Interval {
            start: bound(0)?,
            end: bound(1)?,
        })
    }
}

impl Availability {
    /// Published instant closest to `requested`.
    pub fn nearest(&self, requested: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Availability::Discrete(times) => times
                .iter()
                .min_by_key(|t| (**t - requested).num_seconds().abs())
                .copied(),
            Availability::Interval { start, end } => {
                let mut t = requested;
                if let Some(start) = start {
                    t = t.max(*start);
                }
                if let Some(end) = end {
                    t = t.min(*end);
                }
                Some(t)
            }
        }
    }
}

fn parse_time(s: &str) -> CovJsonResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CovJsonError::InvalidExtent(format!("invalid time '{s}'")))
}
