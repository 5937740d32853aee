//! Gridded analysis fields on a regular latitude/longitude mesh.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Units, ValidTime, WxError, WxResult};

/// Names of the fields requested from a source.
pub type FieldSet = BTreeSet<String>;

/// One analysis field for one valid time.
///
/// Values are stored row-major, `[lat][lon]`; missing cells are NaN. The
/// grid is immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisGrid {
    pub field_name: String,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    pub valid_time: ValidTime,
    pub units: Units,
    values: Vec<f32>,
}

/// One (possibly decimated) grid cell handed to point-style overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSample {
    pub row: usize,
    pub col: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub value: f32,
}

impl AnalysisGrid {
    /// Create a grid, checking that the coordinate axes match the values.
    pub fn new(
        field_name: impl Into<String>,
        values: Vec<f32>,
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
        valid_time: ValidTime,
        units: Units,
    ) -> WxResult<Self> {
        let field_name = field_name.into();
        if latitudes.is_empty() || longitudes.is_empty() {
            return Err(WxError::Decode(format!("{field_name}: empty coordinate axis")));
        }
        let expected = latitudes.len() * longitudes.len();
        if values.len() != expected {
            return Err(WxError::Decode(format!(
                "{field_name}: {} values for a {}x{} grid",
                values.len(),
                latitudes.len(),
                longitudes.len()
            )));
        }

        Ok(Self {
            field_name,
            latitudes,
            longitudes,
            valid_time,
            units,
            values,
        })
    }

    /// Row-major values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// (rows, cols) = (latitudes, longitudes).
    pub fn shape(&self) -> (usize, usize) {
        (self.latitudes.len(), self.longitudes.len())
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.latitudes.len() || col >= self.longitudes.len() {
            return None;
        }
        Some(self.values[row * self.longitudes.len() + col])
    }

    /// Whether the shape invariant still holds (used to vet caller-supplied grids).
    pub fn is_consistent(&self) -> bool {
        !self.latitudes.is_empty()
            && !self.longitudes.is_empty()
            && self.values.len() == self.latitudes.len() * self.longitudes.len()
    }

    /// Number of non-missing cells.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Index of the cell nearest to a point, if the point lies within the grid extent.
    pub fn nearest_index(&self, latitude: f64, longitude: f64) -> Option<(usize, usize)> {
        let row = nearest_on_axis(&self.latitudes, latitude)?;
        let col = nearest_on_axis(&self.longitudes, longitude)?;
        Some((row, col))
    }

    /// Value of the cell nearest to a point.
    pub fn value_near(&self, latitude: f64, longitude: f64) -> Option<f32> {
        let (row, col) = self.nearest_index(latitude, longitude)?;
        self.value(row, col).filter(|v| !v.is_nan())
    }

    /// Every `stride`-th cell in both directions, skipping missing values.
    ///
    /// A stride of 0 is treated as 1.
    pub fn samples(&self, stride: usize) -> impl Iterator<Item = GridSample> + '_ {
        let stride = stride.max(1);
        let nx = self.longitudes.len();

        (0..self.latitudes.len())
            .step_by(stride)
            .flat_map(move |row| (0..nx).step_by(stride).map(move |col| (row, col)))
            .filter_map(move |(row, col)| {
                let value = self.values[row * nx + col];
                (!value.is_nan()).then(|| GridSample {
                    row,
                    col,
                    latitude: self.latitudes[row],
                    longitude: self.longitudes[col],
                    value,
                })
            })
    }
}

/// Nearest index on a monotonic axis, `None` outside the axis range (half a
/// cell of slack at either end).
fn nearest_on_axis(axis: &[f64], coord: f64) -> Option<usize> {
    if axis.is_empty() || !coord.is_finite() {
        return None;
    }

    let first = axis[0];
    let last = axis[axis.len() - 1];
    let half_cell = if axis.len() > 1 {
        ((last - first) / (axis.len() - 1) as f64).abs() / 2.0
    } else {
        0.0
    };
    let (lo, hi) = if first <= last { (first, last) } else { (last, first) };
    if coord < lo - half_cell || coord > hi + half_cell {
        return None;
    }

    axis.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - coord)
                .abs()
                .partial_cmp(&(*b - coord).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
}

/// The fields returned by one fetch, all for the same valid time.
#[derive(Debug, Clone, PartialEq)]
pub struct GridBundle {
    pub valid_time: ValidTime,
    fields: BTreeMap<String, AnalysisGrid>,
}

impl GridBundle {
    pub fn new(valid_time: ValidTime) -> Self {
        Self {
            valid_time,
            fields: BTreeMap::new(),
        }
    }

    /// Add a field; it must share the bundle's valid time.
    pub fn insert(&mut self, grid: AnalysisGrid) -> WxResult<()> {
        if grid.valid_time.utc != self.valid_time.utc {
            return Err(WxError::Decode(format!(
                "{} is valid at {}, bundle at {}",
                grid.field_name,
                grid.valid_time.utc_label(),
                self.valid_time.utc_label()
            )));
        }
        self.fields.insert(grid.field_name.clone(), grid);
        Ok(())
    }

    pub fn get(&self, field_name: &str) -> Option<&AnalysisGrid> {
        self.fields.get(field_name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn grids(&self) -> impl Iterator<Item = &AnalysisGrid> {
        self.fields.values()
    }

    /// First requested field that is absent from the bundle.
    pub fn first_missing<'a>(&self, requested: &'a FieldSet) -> Option<&'a str> {
        requested
            .iter()
            .find(|name| !self.fields.contains_key(name.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
