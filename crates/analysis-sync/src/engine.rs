//! Assembles one time- and space-consistent bundle per request.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use wx_common::{GridBundle, GridSample, ResolvedTimes, StationReport, WxResult};

use crate::acquire::{AcquirePlan, BundleSource, RetryingAcquirer, SuppliedData};
use crate::config::SyncConfig;
use crate::decimate::{DecimationFactor, Decimator};
use crate::fetch::{EdrGridSource, GridSource};
use crate::mask;
use crate::request::SyncRequest;
use crate::resolver::TimeResolver;
use crate::stations::{MetarSource, StationSource};
use crate::style::SampleStyle;

/// Station reports whose time strays from the grid valid time.
///
/// Informational only: the bundle is still usable, the renderer may
/// annotate the plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaleObservationMismatch {
    pub grid_time: DateTime<Utc>,
    pub tolerance_minutes: i64,
    /// Ids of the offending stations, in bundle order.
    pub stations: Vec<String>,
    /// Largest offset among them.
    pub max_offset_minutes: i64,
}

/// Everything the renderer needs for one product.
#[derive(Debug, Clone)]
pub struct SyncedBundle {
    pub grid: GridBundle,
    pub comparison: Option<GridBundle>,
    /// Masked stations in input order; only for overlay products.
    pub stations: Option<Vec<StationReport>>,
    pub stride: DecimationFactor,
    pub times: ResolvedTimes,
    pub style: SampleStyle,
    pub observation_mismatch: Option<StaleObservationMismatch>,
    pub source: BundleSource,
}

/// A station paired with the grid value at its location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationSample<'a> {
    pub station: &'a StationReport,
    /// `None` when the station is off the grid or the cell is missing.
    pub grid_value: Option<f32>,
}

impl SyncedBundle {
    /// Decimated cells of `field` at the bundle's stride.
    pub fn grid_samples<'a>(&'a self, field: &str) -> Option<impl Iterator<Item = GridSample> + 'a> {
        let stride = self.stride.get();
        self.grid.get(field).map(move |grid| grid.samples(stride))
    }

    /// Pair each retained station with the nearest cell of `field`.
    pub fn station_samples(&self, field: &str) -> Vec<StationSample<'_>> {
        let grid = self.grid.get(field);
        self.stations
            .iter()
            .flatten()
            .map(|station| StationSample {
                station,
                grid_value: grid.and_then(|g| g.value_near(station.latitude, station.longitude)),
            })
            .collect()
    }
}

pub struct SyncEngine<G, S> {
    resolver: TimeResolver,
    acquirer: RetryingAcquirer<G, S>,
    decimator: Decimator,
    observation_tolerance: Duration,
}

impl SyncEngine<EdrGridSource, MetarSource> {
    /// Engine over the configured EDR catalog and METAR feed.
    pub fn from_config(config: &SyncConfig) -> WxResult<Self> {
        let grids = EdrGridSource::new(&config.grid_source)?;
        let stations = MetarSource::new(&config.stations)?;
        Ok(Self::new(config, grids, stations))
    }
}

impl<G: GridSource, S: StationSource> SyncEngine<G, S> {
    pub fn new(config: &SyncConfig, grids: G, stations: S) -> Self {
        Self {
            resolver: TimeResolver::from_config(config),
            acquirer: RetryingAcquirer::new(grids, stations, config.retry.delay()),
            decimator: Decimator::new(&config.decimation),
            observation_tolerance: config.observation_tolerance(),
        }
    }

    pub fn resolver(&self) -> &TimeResolver {
        &self.resolver
    }

    pub fn acquirer(&self) -> &RetryingAcquirer<G, S> {
        &self.acquirer
    }

    /// Build the bundle for `request` as of `now`.
    ///
    /// `supplied` data bypasses fetching when it validates, but still goes
    /// through masking and decimation.
    #[instrument(skip(self, request, supplied), fields(kind = ?request.kind, bbox = %request.bbox))]
    pub fn build(
        &self,
        request: &SyncRequest,
        now: DateTime<Utc>,
        supplied: Option<SuppliedData>,
    ) -> WxResult<SyncedBundle> {
        let bbox = request.bbox.validated()?;
        let stride = self
            .decimator
            .decimate_with_base(&bbox, request.coarse, request.decimation_base)?;

        let plan = AcquirePlan {
            kind: request.kind,
            fields: request.fields.clone(),
            bbox,
            times: self.resolver.resolve(now, request.kind),
        };
        let acquired = self.acquirer.acquire(supplied, &plan)?;

        let stations = acquired.stations.map(|reports| {
            let radius = request.mask_radius_km.unwrap_or(0.0);
            let reports = mask::within_box(reports, &bbox);
            let reports = mask::latest_per_station(reports, &acquired.grid.valid_time.utc);
            mask::mask(reports, radius)
                .into_iter()
                .map(|r| request.style.prepare(r))
                .collect::<Vec<_>>()
        });

        let observation_mismatch = stations.as_deref().and_then(|reports| {
            stale_observations(reports, acquired.grid.valid_time.utc, self.observation_tolerance)
        });
        if let Some(mismatch) = &observation_mismatch {
            warn!(
                stations = mismatch.stations.len(),
                max_offset_minutes = mismatch.max_offset_minutes,
                "Station reports differ from the analysis time"
            );
        }

        info!(
            valid_time = %acquired.times.current(),
            source = ?acquired.source,
            stride = stride.get(),
            stations = stations.as_ref().map(Vec::len),
            "Bundle ready"
        );

        Ok(SyncedBundle {
            grid: acquired.grid,
            comparison: acquired.comparison,
            stations,
            stride,
            times: acquired.times,
            style: request.style,
            observation_mismatch,
            source: acquired.source,
        })
    }
}

/// Stations reported more than `tolerance` away from `grid_time`.
pub fn stale_observations(
    stations: &[StationReport],
    grid_time: DateTime<Utc>,
    tolerance: Duration,
) -> Option<StaleObservationMismatch> {
    let offsets: Vec<(&str, i64)> = stations
        .iter()
        .map(|s| (s.id.as_str(), (s.report_time - grid_time).num_minutes().abs()))
        .filter(|(_, minutes)| *minutes > tolerance.num_minutes())
        .collect();

    let max_offset_minutes = offsets.iter().map(|(_, m)| *m).max()?;
    Some(StaleObservationMismatch {
        grid_time,
        tolerance_minutes: tolerance.num_minutes(),
        stations: offsets.iter().map(|(id, _)| id.to_string()).collect(),
        max_offset_minutes,
    })
}
