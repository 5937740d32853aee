//! How sampled points are drawn, and what that means for wind data.

use serde::{Deserialize, Serialize};

use wx_common::station::fields;
use wx_common::StationReport;

/// Glyph used for each plotted sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStyle {
    Barbs,
    Quivers,
    /// Scalar markers only; wind vectors are not drawn.
    Points,
}

impl SampleStyle {
    pub fn needs_vectors(&self) -> bool {
        matches!(self, SampleStyle::Barbs | SampleStyle::Quivers)
    }

    /// Prepare a station report for this style.
    ///
    /// Vector styles get `u_wind`/`v_wind` derived from speed and direction
    /// when the report lacks them; `Points` drops every wind vector field.
    pub fn prepare(&self, mut report: StationReport) -> StationReport {
        if !self.needs_vectors() {
            report.fields.retain(|name, _| !fields::is_vector_field(name));
            return report;
        }

        let has_components =
            report.field(fields::U_WIND).is_some() && report.field(fields::V_WIND).is_some();
        if has_components {
            return report;
        }

        let speed = report.field(fields::WIND_SPEED).cloned();
        let direction = report.field(fields::WIND_DIRECTION).map(|m| m.value);
        if let (Some(speed), Some(direction)) = (speed, direction) {
            let (u, v) = speed_direction_to_uv(speed.value, direction);
            report = report
                .with_field(fields::U_WIND, u, speed.units.clone())
                .with_field(fields::V_WIND, v, speed.units);
        }
        report
    }
}

/// Convert speed and meteorological direction (degrees the wind blows FROM)
/// to U and V components in the same unit as `speed`.
pub fn speed_direction_to_uv(speed: f64, direction_deg: f64) -> (f64, f64) {
    let rad = direction_deg.to_radians();
    (-speed * rad.sin(), -speed * rad.cos())
}
