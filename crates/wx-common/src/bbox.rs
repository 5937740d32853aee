//! Geographic bounding box of a rendered map area.

use serde::{Deserialize, Serialize};

use crate::{WxError, WxResult};

/// A west/east/south/north extent in degrees.
///
/// A box is only meaningful once [`BoundingBox::validated`] has accepted it:
/// `west < east`, `south < north`, all edges finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Create a bounding box from its four edges.
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            west,
            east,
            south,
            north,
        }
    }

    /// Parse a "west,south,east,north" string (the OGC BBOX axis order).
    pub fn from_bbox_str(s: &str) -> WxResult<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(WxError::InvalidExtent(format!(
                "{s}: expected 'west,south,east,north'"
            )));
        }

        let mut edges = [0.0f64; 4];
        for (edge, part) in edges.iter_mut().zip(&parts) {
            *edge = part
                .parse()
                .map_err(|_| WxError::InvalidExtent(format!("invalid number '{part}'")))?;
        }

        Self::new(edges[0], edges[2], edges[1], edges[3]).validated()
    }

    /// Check the box invariants, returning the box unchanged if they hold.
    pub fn validated(self) -> WxResult<Self> {
        let edges = [self.west, self.east, self.south, self.north];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(WxError::InvalidExtent(format!("non-finite edge in {self}")));
        }
        if self.west >= self.east {
            return Err(WxError::InvalidExtent(format!(
                "west ({}) must be less than east ({})",
                self.west, self.east
            )));
        }
        if self.south >= self.north {
            return Err(WxError::InvalidExtent(format!(
                "south ({}) must be less than north ({})",
                self.south, self.north
            )));
        }
        if !(-90.0..=90.0).contains(&self.south) || !(-90.0..=90.0).contains(&self.north) {
            return Err(WxError::InvalidExtent(format!("latitude out of range in {self}")));
        }
        Ok(self)
    }

    /// East-west extent in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// North-south extent in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Area in square degrees.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Side length of the square with the same degree area.
    pub fn effective_span(&self) -> f64 {
        self.area().max(0.0).sqrt()
    }

    /// Check if a point lies inside the box (edges inclusive).
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        longitude >= self.west
            && longitude <= self.east
            && latitude >= self.south
            && latitude <= self.north
    }

    /// `bbox` query value for the METAR data API: "south,west,north,east".
    pub fn to_lat_lon_param(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[W {} E {} S {} N {}]",
            self.west, self.east, self.south, self.north
        )
    }
}
