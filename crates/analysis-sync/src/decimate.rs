//! Adaptive sample spacing for overlaid points.
//!
//! The stride grows with the map area so that barbs, arrows or markers stay
//! legible whether the box covers a county or a hemisphere.

use serde::Serialize;

use wx_common::{BoundingBox, WxResult};

use crate::config::{DecimationConfig, DecimationStep};

/// Sample every n-th grid cell along each axis. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DecimationFactor(usize);

impl DecimationFactor {
    pub const MIN: DecimationFactor = DecimationFactor(1);

    pub fn new(stride: usize) -> Self {
        Self(stride.max(1))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for DecimationFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps a bounding box to a stride through a step table.
#[derive(Debug, Clone)]
pub struct Decimator {
    steps: Vec<DecimationStep>,
    max_stride: usize,
    coarse_multiplier: usize,
}

impl Decimator {
    /// Build from configuration. Steps are ordered by span and strides are
    /// made non-decreasing, so the stride never shrinks as the box grows.
    pub fn new(config: &DecimationConfig) -> Self {
        let mut steps = config.steps.clone();
        steps.sort_by(|a, b| a.max_span_deg.total_cmp(&b.max_span_deg));

        let mut floor = 1;
        for step in &mut steps {
            step.stride = step.stride.max(floor);
            floor = step.stride;
        }

        Self {
            steps,
            max_stride: config.max_stride.max(floor),
            coarse_multiplier: config.coarse_multiplier.max(1),
        }
    }

    /// Stride for `bbox`; `coarse` multiplies it by the configured factor.
    pub fn decimate(&self, bbox: &BoundingBox, coarse: bool) -> WxResult<DecimationFactor> {
        self.decimate_with_base(bbox, coarse, 1)
    }

    /// Like [`Decimator::decimate`], never going below `base` before the
    /// coarse multiplier is applied.
    pub fn decimate_with_base(
        &self,
        bbox: &BoundingBox,
        coarse: bool,
        base: usize,
    ) -> WxResult<DecimationFactor> {
        let bbox = bbox.validated()?;
        let span = bbox.effective_span();

        let stride = self
            .steps
            .iter()
            .find(|step| span < step.max_span_deg)
            .map(|step| step.stride)
            .unwrap_or(self.max_stride)
            .max(base);

        let multiplier = if coarse { self.coarse_multiplier } else { 1 };
        Ok(DecimationFactor::new(stride.saturating_mul(multiplier)))
    }
}

impl Default for Decimator {
    fn default() -> Self {
        Self::new(&DecimationConfig::default())
    }
}
