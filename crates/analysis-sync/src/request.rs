//! What a caller asks the sync engine for.

use serde::{Deserialize, Serialize};

use wx_common::{BoundingBox, FieldSet};

use crate::config::RegionConfig;
use crate::style::SampleStyle;

/// The kinds of product the engine can assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// A single analysis field set.
    Analysis,
    /// The latest analysis and the one 24 hours earlier.
    Comparison,
    /// An analysis with surface station reports plotted over it.
    StationOverlay,
}

impl ProductKind {
    pub fn needs_comparison(&self) -> bool {
        matches!(self, ProductKind::Comparison)
    }

    pub fn needs_stations(&self) -> bool {
        matches!(self, ProductKind::StationOverlay)
    }
}

/// One bundle request.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub kind: ProductKind,
    /// Grid fields to acquire.
    pub fields: FieldSet,
    pub bbox: BoundingBox,
    pub style: SampleStyle,
    /// Sample every grid cell at a coarser spacing.
    pub coarse: bool,
    /// Overrides the region's station mask radius.
    pub mask_radius_km: Option<f64>,
    /// Smallest stride to use, usually the region's `decimation_base`.
    pub decimation_base: usize,
}

impl SyncRequest {
    /// Request over an arbitrary box with no region defaults.
    ///
    /// Mask radius and stride floor come only from [`SyncRequest::for_region`]
    /// or the `with_*` setters. Without a radius, an overlay mask only
    /// collapses co-located stations (0 km).
    pub fn new<I, S>(kind: ProductKind, fields: I, bbox: BoundingBox) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            fields: fields.into_iter().map(Into::into).collect(),
            bbox,
            style: SampleStyle::Points,
            coarse: false,
            mask_radius_km: None,
            decimation_base: 1,
        }
    }

    /// Request over a configured region, taking its box, mask radius and
    /// stride floor.
    pub fn for_region<I, S>(kind: ProductKind, fields: I, region: &RegionConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(kind, fields, region.bbox)
            .with_mask_radius_km(region.mask_radius_km)
            .with_decimation_base(region.decimation_base)
    }

    pub fn with_style(mut self, style: SampleStyle) -> Self {
        self.style = style;
        self
    }

    pub fn coarse(mut self, coarse: bool) -> Self {
        self.coarse = coarse;
        self
    }

    pub fn with_mask_radius_km(mut self, radius_km: f64) -> Self {
        self.mask_radius_km = Some(radius_km);
        self
    }

    pub fn with_decimation_base(mut self, base: usize) -> Self {
        self.decimation_base = base.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_carries_no_region_defaults() {
        let bbox = BoundingBox::new(-125.0, -114.0, 32.0, 42.0);
        let request = SyncRequest::new(ProductKind::StationOverlay, ["TMP"], bbox);
        assert_eq!(request.mask_radius_km, None);
        assert_eq!(request.decimation_base, 1);

        let region = RegionConfig {
            bbox,
            mask_radius_km: 50.0,
            decimation_base: 2,
        };
        let request = SyncRequest::for_region(ProductKind::StationOverlay, ["TMP"], &region);
        assert_eq!(request.mask_radius_km, Some(50.0));
        assert_eq!(request.decimation_base, 2);
    }
}
