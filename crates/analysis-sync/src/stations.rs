//! Surface station report sources.

use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use wx_common::station::fields;
use wx_common::{BoundingBox, StationReport, Units, ValidTime, WxError, WxResult};

use crate::config::StationSourceConfig;
use crate::http;

/// Anything that can deliver station reports near a valid time.
pub trait StationSource {
    fn fetch_stations(
        &self,
        valid_time: &ValidTime,
        bbox: &BoundingBox,
    ) -> WxResult<Vec<StationReport>>;
}

impl<T: StationSource + ?Sized> StationSource for &T {
    fn fetch_stations(
        &self,
        valid_time: &ValidTime,
        bbox: &BoundingBox,
    ) -> WxResult<Vec<StationReport>> {
        (**self).fetch_stations(valid_time, bbox)
    }
}

impl<T: StationSource + ?Sized> StationSource for Box<T> {
    fn fetch_stations(
        &self,
        valid_time: &ValidTime,
        bbox: &BoundingBox,
    ) -> WxResult<Vec<StationReport>> {
        (**self).fetch_stations(valid_time, bbox)
    }
}

/// METAR reports from an aviationweather.gov-style data API.
pub struct MetarSource {
    client: Client,
    url: String,
    lookback: Duration,
}

impl MetarSource {
    pub fn new(config: &StationSourceConfig) -> WxResult<Self> {
        let client = http::build_client(config.timeout(), &config.user_agent)?;
        Ok(Self {
            client,
            url: config.url.clone(),
            lookback: config.lookback(),
        })
    }

    fn query(&self, valid_time: &ValidTime, bbox: &BoundingBox) -> Vec<(&'static str, String)> {
        let hours = ((self.lookback.num_minutes() + 59) / 60).max(1);
        vec![
            ("bbox", bbox.to_lat_lon_param()),
            ("format", "json".to_string()),
            ("date", valid_time.utc.format("%Y%m%d_%H%MZ").to_string()),
            ("hours", hours.to_string()),
        ]
    }
}

impl StationSource for MetarSource {
    #[instrument(skip(self, bbox), fields(valid_time = %valid_time.utc_label()))]
    fn fetch_stations(
        &self,
        valid_time: &ValidTime,
        bbox: &BoundingBox,
    ) -> WxResult<Vec<StationReport>> {
        let bbox = bbox.validated()?;
        let body = http::get_text(&self.client, &self.url, &self.query(valid_time, &bbox))?;
        let reports = match body {
            Some(body) => decode_metar_json(&body, valid_time, self.lookback)?,
            None => Vec::new(),
        };
        info!(stations = reports.len(), "Fetched station reports");
        Ok(reports)
    }
}

/// One record of the METAR JSON feed. Only the fields we plot are read.
#[derive(Debug, Deserialize)]
struct MetarRecord {
    #[serde(rename = "icaoId")]
    icao_id: String,
    #[serde(rename = "obsTime", default)]
    obs_time: Option<i64>,
    #[serde(rename = "reportTime", default)]
    report_time: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    temp: Option<f64>,
    #[serde(default)]
    dewp: Option<f64>,
    /// Degrees, or "VRB" for variable winds.
    #[serde(default)]
    wdir: Option<serde_json::Value>,
    #[serde(default)]
    wspd: Option<f64>,
    #[serde(default)]
    wgst: Option<f64>,
    /// Statute miles, sometimes as text like "10+".
    #[serde(default)]
    visib: Option<serde_json::Value>,
    #[serde(default)]
    altim: Option<f64>,
    #[serde(default)]
    slp: Option<f64>,
}

impl MetarRecord {
    fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.obs_time
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .or_else(|| {
                self.report_time
                    .as_deref()
                    .and_then(|s| ValidTime::parse_utc(s).ok())
            })
    }

    fn into_report(self) -> Option<StationReport> {
        let report_time = self.observed_at()?;
        let (lat, lon) = (self.lat?, self.lon?);

        let mut report = StationReport::new(self.icao_id, lat, lon, report_time);
        let mut put = |name: &str, value: Option<f64>, units: Units| {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                report
                    .fields
                    .insert(name.to_string(), wx_common::Measurement::new(v, units));
            }
        };
        put(fields::TEMPERATURE, self.temp, Units::Celsius);
        put(fields::DEWPOINT, self.dewp, Units::Celsius);
        put(
            fields::WIND_DIRECTION,
            self.wdir.as_ref().and_then(numeric),
            Units::Degrees,
        );
        put(fields::WIND_SPEED, self.wspd, Units::Knots);
        put(fields::WIND_GUST, self.wgst, Units::Knots);
        put(
            fields::VISIBILITY,
            self.visib.as_ref().and_then(numeric),
            Units::StatuteMiles,
        );
        put(fields::ALTIMETER, self.altim, Units::Hectopascals);
        put(fields::SEA_LEVEL_PRESSURE, self.slp, Units::Hectopascals);
        Some(report)
    }
}

/// A number, or text like "10+" with a trailing qualifier. "VRB" is `None`.
fn numeric(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().trim_end_matches('+').parse().ok(),
        _ => None,
    }
}

/// Decode a METAR JSON array, keeping reports within `lookback` of the valid
/// time. Records without a time or location are skipped.
pub fn decode_metar_json(
    body: &str,
    valid_time: &ValidTime,
    lookback: Duration,
) -> WxResult<Vec<StationReport>> {
    let records: Vec<MetarRecord> =
        serde_json::from_str(body).map_err(|e| WxError::Decode(format!("METAR JSON: {e}")))?;

    let total = records.len();
    let reports: Vec<StationReport> = records
        .into_iter()
        .filter_map(MetarRecord::into_report)
        .filter(|r| valid_time.distance_to(&r.report_time) <= lookback)
        .collect();

    if reports.len() < total {
        debug!(
            total = total,
            kept = reports.len(),
            "Skipped METAR records outside the window or without a time or location"
        );
    }
    Ok(reports)
}
