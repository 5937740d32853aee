//! OGC API - Environmental Data Retrieval (EDR) client-side types.
//!
//! Covers the pieces needed to consume a gridded analysis catalog:
//! collection metadata with its temporal extent, cube query parameters, and
//! CoverageJSON grid responses.
//!
//! # Example
//!
//! ```rust
//! use edr_protocol::CoverageJson;
//!
//! let doc = r#"{
//!     "type": "Coverage",
//!     "domain": {"axes": {"x": {"values": [0.0]}, "y": {"values": [0.0]}}},
//!     "ranges": {"TMP": {"values": [280.5]}}
//! }"#;
//! let cov: CoverageJson = serde_json::from_str(doc).unwrap();
//! assert_eq!(cov.grid_values("TMP").unwrap(), vec![280.5]);
//! ```

pub mod collections;
pub mod coverage_json;
pub mod errors;
pub mod parameters;
pub mod queries;
pub mod types;

pub use collections::Collection;
pub use coverage_json::{Axis, AxisValue, CoverageJson, Domain, NdArray};
pub use errors::{CovJsonError, CovJsonResult};
pub use parameters::{Label, Parameter, Unit, UnitSymbol};
pub use queries::{BboxQuery, CubeQuery};
pub use types::{Availability, Extent, SpatialExtent, TemporalExtent};
