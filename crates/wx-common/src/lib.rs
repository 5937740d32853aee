//! Common types shared across the analysis acquisition workspace.

pub mod bbox;
pub mod distance;
pub mod error;
pub mod grid;
pub mod station;
pub mod time;
pub mod units;

pub use bbox::BoundingBox;
pub use distance::haversine_km;
pub use error::{WxError, WxResult};
pub use grid::{AnalysisGrid, FieldSet, GridBundle, GridSample};
pub use station::{Measurement, StationReport};
pub use time::{ResolvedTimes, ValidTime};
pub use units::Units;
