//! Gridded analysis sources.
//!
//! A [`GridSource`] answers one question: give me these fields for the
//! analysis nearest time T over this box. It never retries; that is the
//! acquirer's job.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use tracing::{debug, info, instrument};

use edr_protocol::{Availability, BboxQuery, Collection, CoverageJson, CubeQuery};
use wx_common::{
    AnalysisGrid, BoundingBox, FieldSet, GridBundle, Units, ValidTime, WxError, WxResult,
};

use crate::config::GridSourceConfig;
use crate::http;

/// Anything that can deliver analysis fields for a valid time.
pub trait GridSource {
    /// Fetch `fields` for the published analysis nearest `valid_time`.
    ///
    /// The returned bundle carries the published valid time, in the same
    /// display zone as `valid_time`.
    fn fetch(
        &self,
        fields: &FieldSet,
        valid_time: &ValidTime,
        bbox: &BoundingBox,
    ) -> WxResult<GridBundle>;
}

impl<T: GridSource + ?Sized> GridSource for &T {
    fn fetch(
        &self,
        fields: &FieldSet,
        valid_time: &ValidTime,
        bbox: &BoundingBox,
    ) -> WxResult<GridBundle> {
        (**self).fetch(fields, valid_time, bbox)
    }
}

impl<T: GridSource + ?Sized> GridSource for Box<T> {
    fn fetch(
        &self,
        fields: &FieldSet,
        valid_time: &ValidTime,
        bbox: &BoundingBox,
    ) -> WxResult<GridBundle> {
        (**self).fetch(fields, valid_time, bbox)
    }
}

/// Grid source backed by an OGC EDR collection serving CoverageJSON.
pub struct EdrGridSource {
    client: Client,
    base_url: String,
    collection: String,
    tolerance: chrono::Duration,
}

impl EdrGridSource {
    pub fn new(config: &GridSourceConfig) -> WxResult<Self> {
        let client = http::build_client(config.timeout(), &config.user_agent)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            tolerance: config.tolerance(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    /// Collection metadata: published times and parameter names.
    pub fn describe(&self) -> WxResult<Collection> {
        http::get_json(&self.client, &self.collection_url(), &[])
    }

    fn cube(&self, query: &CubeQuery) -> WxResult<CoverageJson> {
        let url = format!("{}/cube", self.collection_url());
        http::get_json(&self.client, &url, &query.query_pairs())
    }
}

impl GridSource for EdrGridSource {
    #[instrument(skip(self, field_names, bbox), fields(collection = %self.collection, requested = %valid_time.utc_label()))]
    fn fetch(
        &self,
        field_names: &FieldSet,
        valid_time: &ValidTime,
        bbox: &BoundingBox,
    ) -> WxResult<GridBundle> {
        let bbox = bbox.validated()?;
        let collection = self.describe()?;

        if !collection.parameter_names.is_empty() {
            if let Some(missing) = field_names.iter().find(|f| !collection.has_parameter(f)) {
                return Err(WxError::field_not_found(missing.as_str(), valid_time.utc_label()));
            }
        }

        let availability = collection
            .availability()
            .map_err(|e| WxError::Decode(format!("{}: {e}", self.collection)))?;
        let published = select_published(&availability, valid_time.utc, self.tolerance)?;
        let published = ValidTime::new(published, valid_time.zone());
        debug!(published = %published.utc_label(), "Selected published analysis");

        let query = CubeQuery::new(
            BboxQuery {
                west: bbox.west,
                south: bbox.south,
                east: bbox.east,
                north: bbox.north,
            },
            published.utc,
            field_names.iter().cloned().collect(),
        );
        let coverage = self.cube(&query)?;
        let bundle = decode_coverage(&coverage, field_names, published)?;

        info!(
            valid_time = %published.utc_label(),
            fields = bundle.len(),
            "Fetched analysis"
        );
        Ok(bundle)
    }
}

/// Published time nearest `requested`, if one lies within `tolerance`.
pub fn select_published(
    availability: &Availability,
    requested: DateTime<Utc>,
    tolerance: chrono::Duration,
) -> WxResult<DateTime<Utc>> {
    let nearest = availability.nearest(requested).ok_or_else(|| {
        WxError::DataUnavailable("catalog lists no published analyses".to_string())
    })?;

    let gap = (nearest - requested).num_seconds().abs();
    if gap > tolerance.num_seconds() {
        return Err(WxError::DataUnavailable(format!(
            "nearest published analysis {} is {} min from requested {}",
            nearest.format("%Y-%m-%dT%H:%MZ"),
            gap / 60,
            requested.format("%Y-%m-%dT%H:%MZ")
        )));
    }
    Ok(nearest)
}

/// Turn a CoverageJSON response into a bundle of `fields` valid at `valid_time`.
pub fn decode_coverage(
    coverage: &CoverageJson,
    fields: &FieldSet,
    valid_time: ValidTime,
) -> WxResult<GridBundle> {
    let decode_err = |e: edr_protocol::CovJsonError| WxError::Decode(e.to_string());

    let mut bundle = GridBundle::new(valid_time);
    for field in fields {
        let member = coverage
            .coverage_for(field)
            .ok_or_else(|| WxError::field_not_found(field.as_str(), valid_time.utc_label()))?;

        let times = member.times().map_err(decode_err)?;
        if !times.is_empty() {
            let stamps = times
                .iter()
                .map(|t| ValidTime::parse_utc(t))
                .collect::<WxResult<Vec<_>>>()?;
            if !stamps.contains(&valid_time.utc) {
                return Err(WxError::Decode(format!(
                    "{field}: coverage times {times:?} do not include {}",
                    valid_time.utc_label()
                )));
            }
        }

        // Values first: their shape check bounds the axis lengths
        let values = member.grid_values(field).map_err(decode_err)?;
        let (latitudes, longitudes) = member.coordinates().map_err(decode_err)?;
        let units = member
            .unit_symbol(field)
            .or_else(|| coverage.unit_symbol(field))
            .map(Units::from_symbol)
            .unwrap_or(Units::Unknown);

        let grid = AnalysisGrid::new(field.as_str(), values, latitudes, longitudes, valid_time, units)?;
        bundle.insert(grid)?;
    }
    Ok(bundle)
}
