//! Bundle probe.
//!
//! Resolves the latest analysis time for a configured region, acquires the
//! grid (and comparison grid or station reports when the product needs
//! them) and prints what the renderer would receive as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use analysis_sync::{
    load_sync_config, BundleSource, ProductKind, SampleStyle, StaleObservationMismatch,
    SyncEngine, SyncRequest, SyncedBundle,
};
use wx_common::{BoundingBox, ValidTime};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Analysis,
    Comparison,
    Overlay,
}

impl From<KindArg> for ProductKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Analysis => ProductKind::Analysis,
            KindArg::Comparison => ProductKind::Comparison,
            KindArg::Overlay => ProductKind::StationOverlay,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StyleArg {
    Barbs,
    Quivers,
    Points,
}

impl From<StyleArg> for SampleStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Barbs => SampleStyle::Barbs,
            StyleArg::Quivers => SampleStyle::Quivers,
            StyleArg::Points => SampleStyle::Points,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "bundle-probe")]
#[command(about = "Build one synchronized analysis bundle and print a summary")]
struct Args {
    /// Configuration file
    #[arg(long, env = "SYNC_CONFIG", default_value = "config/analysis-sync.yaml")]
    config: PathBuf,

    /// Configured region to build for
    #[arg(short, long, default_value = "california")]
    region: String,

    /// Override the region's box: west,south,east,north
    #[arg(long, allow_hyphen_values = true)]
    bbox: Option<String>,

    /// Product to build
    #[arg(short, long, value_enum, default_value = "analysis")]
    kind: KindArg,

    /// Grid fields to acquire
    #[arg(short, long, value_delimiter = ',', default_value = "TMP")]
    fields: Vec<String>,

    /// How station samples are drawn
    #[arg(long, value_enum, default_value = "points")]
    style: StyleArg,

    /// Sample the grid at a coarser stride
    #[arg(long)]
    coarse: bool,

    /// Override the region's station mask radius (km)
    #[arg(long)]
    mask_radius_km: Option<f64>,

    /// Pretend the current time is this instant (RFC 3339)
    #[arg(long)]
    now: Option<String>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

#[derive(Serialize)]
struct TimeSummary {
    utc: String,
    local: String,
}

impl From<&ValidTime> for TimeSummary {
    fn from(vt: &ValidTime) -> Self {
        Self {
            utc: vt.utc_label(),
            local: vt.local_label(),
        }
    }
}

#[derive(Serialize)]
struct FieldSummary {
    field: String,
    units: String,
    rows: usize,
    cols: usize,
    valid_cells: usize,
    sampled_cells: usize,
}

#[derive(Serialize)]
struct BundleSummary {
    region: String,
    bbox: BoundingBox,
    kind: ProductKind,
    style: SampleStyle,
    source: BundleSource,
    stride: usize,
    current: TimeSummary,
    previous: Option<TimeSummary>,
    fields: Vec<FieldSummary>,
    stations: Option<Vec<String>>,
    observation_mismatch: Option<StaleObservationMismatch>,
}

impl BundleSummary {
    fn new(region: &str, request: &SyncRequest, bundle: &SyncedBundle) -> Self {
        let fields = bundle
            .grid
            .grids()
            .map(|grid| {
                let (rows, cols) = grid.shape();
                FieldSummary {
                    field: grid.field_name.clone(),
                    units: grid.units.symbol().to_string(),
                    rows,
                    cols,
                    valid_cells: grid.valid_count(),
                    sampled_cells: grid.samples(bundle.stride.get()).count(),
                }
            })
            .collect();

        Self {
            region: region.to_string(),
            bbox: request.bbox,
            kind: request.kind,
            style: bundle.style,
            source: bundle.source,
            stride: bundle.stride.get(),
            current: bundle.times.current().into(),
            previous: bundle.times.previous().map(Into::into),
            fields,
            stations: bundle
                .stations
                .as_ref()
                .map(|s| s.iter().map(|r| r.id.clone()).collect()),
            observation_mismatch: bundle.observation_mismatch.clone(),
        }
    }
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr so stdout carries only the summary
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Invalid --now timestamp '{s}'")),
        None => Ok(Utc::now()),
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    let config = load_sync_config(&args.config)?;
    let region = config.region(&args.region)?;

    let mut request = SyncRequest::for_region(args.kind.into(), args.fields.clone(), region)
        .with_style(args.style.into())
        .coarse(args.coarse);
    if let Some(radius) = args.mask_radius_km {
        request = request.with_mask_radius_km(radius);
    }
    if let Some(bbox) = &args.bbox {
        request.bbox = BoundingBox::from_bbox_str(bbox)?;
    }

    let now = parse_now(args.now.as_deref())?;
    info!(
        region = %args.region,
        bbox = %request.bbox,
        kind = ?request.kind,
        now = %now.format("%Y-%m-%dT%H:%MZ"),
        "Building bundle"
    );

    let engine = SyncEngine::from_config(&config)?;
    let bundle = engine.build(&request, now, None)?;

    let summary = BundleSummary::new(&args.region, &request, &bundle);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
