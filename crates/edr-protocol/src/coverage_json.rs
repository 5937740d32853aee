//! CoverageJSON documents returned by EDR cube/area queries.
//!
//! Only the grid subset of CoverageJSON is interpreted: a domain with `x`/`y`
//! axes (plus optional singleton `t`/`z`) and one NdArray range per parameter.
//!
//! See: <https://covjson.org/>

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{CovJsonError, CovJsonResult};
use crate::parameters::Parameter;

/// A CoverageJSON `Coverage` or `CoverageCollection`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageJson {
    /// "Coverage" or "CoverageCollection".
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, Parameter>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub ranges: HashMap<String, NdArray>,

    /// Member coverages of a `CoverageCollection`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coverages: Vec<CoverageJson>,
}

/// The domain of a coverage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    #[serde(rename = "domainType", default, skip_serializing_if = "Option::is_none")]
    pub domain_type: Option<String>,

    pub axes: HashMap<String, Axis>,
}

/// An axis in the domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Axis {
    /// Explicit list of values.
    Values { values: Vec<AxisValue> },
    /// Regular axis defined by start, stop, and number of points.
    Regular { start: f64, stop: f64, num: usize },
}

/// A value on an axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AxisValue {
    Float(f64),
    String(String),
}

/// N-dimensional array containing data values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NdArray {
    #[serde(rename = "dataType", default = "default_data_type")]
    pub data_type: String,

    #[serde(rename = "axisNames", default, skip_serializing_if = "Option::is_none")]
    pub axis_names: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,

    /// Values in axis order; null marks missing data.
    pub values: Vec<Option<f32>>,
}

fn default_data_type() -> String {
    "float".to_string()
}

/// Largest regular axis expanded into coordinates. A 0.01 degree global
/// grid has 36,000 longitudes.
pub const MAX_REGULAR_STEPS: usize = 100_000;

impl Axis {
    pub fn len(&self) -> usize {
        match self {
            Axis::Values { values } => values.len(),
            Axis::Regular { num, .. } => *num,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric coordinates along the axis.
    pub fn to_f64(&self, name: &str) -> CovJsonResult<Vec<f64>> {
        match self {
            Axis::Regular { num, .. } if *num > MAX_REGULAR_STEPS => Err(CovJsonError::InvalidAxis {
                axis: name.to_string(),
                message: format!("{num} steps exceeds the limit of {MAX_REGULAR_STEPS}"),
            }),
            Axis::Regular { start, stop, .. } if !start.is_finite() || !stop.is_finite() => {
                Err(CovJsonError::InvalidAxis {
                    axis: name.to_string(),
                    message: format!("non-finite bounds {start}..{stop}"),
                })
            }
            Axis::Regular { start, stop, num } => match *num {
                0 => Ok(Vec::new()),
                1 => Ok(vec![*start]),
                n => {
                    let step = (stop - start) / (n - 1) as f64;
                    Ok((0..n).map(|i| start + step * i as f64).collect())
                }
            },
            Axis::Values { values } => values
                .iter()
                .map(|v| match v {
                    AxisValue::Float(f) => Ok(*f),
                    AxisValue::String(s) => Err(CovJsonError::InvalidAxis {
                        axis: name.to_string(),
                        message: format!("expected number, found '{s}'"),
                    }),
                })
                .collect(),
        }
    }

    /// Textual values along the axis (timestamps on `t`).
    pub fn to_strings(&self, name: &str) -> CovJsonResult<Vec<String>> {
        match self {
            Axis::Values { values } => values
                .iter()
                .map(|v| match v {
                    AxisValue::String(s) => Ok(s.clone()),
                    AxisValue::Float(f) => Err(CovJsonError::InvalidAxis {
                        axis: name.to_string(),
                        message: format!("expected string, found {f}"),
                    }),
                })
                .collect(),
            Axis::Regular { .. } => Err(CovJsonError::InvalidAxis {
                axis: name.to_string(),
                message: "regular axis has no textual values".to_string(),
            }),
        }
    }
}

impl CoverageJson {
    /// The coverage holding a range for `parameter`, descending into
    /// collection members when needed.
    pub fn coverage_for(&self, parameter: &str) -> Option<&CoverageJson> {
        if self.ranges.contains_key(parameter) {
            return Some(self);
        }
        self.coverages.iter().find_map(|c| c.coverage_for(parameter))
    }

    pub fn axis(&self, name: &str) -> CovJsonResult<&Axis> {
        self.domain
            .as_ref()
            .and_then(|d| d.axes.get(name))
            .ok_or_else(|| CovJsonError::MissingAxis(name.to_string()))
    }

    /// (latitudes, longitudes) from the `y` and `x` axes.
    pub fn coordinates(&self) -> CovJsonResult<(Vec<f64>, Vec<f64>)> {
        let y = self.axis("y")?.to_f64("y")?;
        let x = self.axis("x")?.to_f64("x")?;
        Ok((y, x))
    }

    /// Timestamps on the `t` axis; empty when the domain has none.
    pub fn times(&self) -> CovJsonResult<Vec<String>> {
        match self.axis("t") {
            Ok(axis) => axis.to_strings("t"),
            Err(CovJsonError::MissingAxis(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub fn unit_symbol(&self, parameter: &str) -> Option<&str> {
        self.parameters.get(parameter).and_then(Parameter::unit_symbol)
    }

    /// Range of `parameter` as a row-major `[y][x]` grid, null mapped to NaN.
    ///
    /// Axes other than `x`/`y` must be singletons and are squeezed out; an
    /// `[x, y]` axis order is transposed.
    pub fn grid_values(&self, parameter: &str) -> CovJsonResult<Vec<f32>> {
        let range = self
            .ranges
            .get(parameter)
            .ok_or_else(|| CovJsonError::MissingRange(parameter.to_string()))?;
        let ny = self.axis("y")?.len();
        let nx = self.axis("x")?.len();

        let mismatch = |message: String| CovJsonError::ShapeMismatch {
            parameter: parameter.to_string(),
            message,
        };

        let axis_names = range
            .axis_names
            .clone()
            .unwrap_or_else(|| vec!["y".to_string(), "x".to_string()]);
        let shape = range.shape.clone().unwrap_or_else(|| vec![ny, nx]);

        if axis_names.len() != shape.len() {
            return Err(mismatch(format!(
                "{} axis names for a {}-d shape",
                axis_names.len(),
                shape.len()
            )));
        }
        let cells = shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| mismatch(format!("shape {shape:?} overflows")))?;
        if cells != range.values.len() {
            return Err(mismatch(format!(
                "shape {:?} does not hold {} values",
                shape,
                range.values.len()
            )));
        }

        let mut spatial = Vec::with_capacity(2);
        for (name, size) in axis_names.iter().zip(&shape) {
            match name.as_str() {
                "x" | "y" => spatial.push((name.as_str(), *size)),
                _ if *size == 1 => {}
                other => {
                    return Err(mismatch(format!(
                        "axis '{other}' has {size} steps, expected a single one"
                    )))
                }
            }
        }

        let values = range.values.iter().map(|v| v.unwrap_or(f32::NAN));
        match spatial.as_slice() {
            [("y", h), ("x", w)] if *h == ny && *w == nx => Ok(values.collect()),
            [("x", w), ("y", h)] if *h == ny && *w == nx => {
                let column_major: Vec<f32> = values.collect();
                let mut row_major = vec![f32::NAN; nx * ny];
                for col in 0..nx {
                    for row in 0..ny {
                        row_major[row * nx + col] = column_major[col * ny + row];
                    }
                }
                Ok(row_major)
            }
            _ => Err(mismatch(format!(
                "range axes {:?} {:?} do not match a {}x{} domain",
                axis_names, shape, ny, nx
            ))),
        }
    }
}
