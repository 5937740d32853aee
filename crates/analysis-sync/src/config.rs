//! Configuration for analysis acquisition.
//!
//! Loaded once at startup from YAML (`config/analysis-sync.yaml`) and passed
//! by reference afterwards. Supports environment variable substitution using
//! `${VAR}` and `${VAR:-default}` syntax.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use wx_common::{BoundingBox, WxError, WxResult};

// ============================================================================
// Configuration types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Zone used for local valid-time labels.
    #[serde(default = "default_display_timezone")]
    pub display_timezone: Tz,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    pub grid_source: GridSourceConfig,

    pub stations: StationSourceConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Largest tolerated gap between a station report and the grid valid time.
    #[serde(default = "default_observation_tolerance_minutes")]
    pub observation_tolerance_minutes: u64,

    #[serde(default)]
    pub decimation: DecimationConfig,

    #[serde(default)]
    pub regions: BTreeMap<String, RegionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Analysis publication cadence.
    pub cadence_minutes: u64,
    /// How long after its valid time an analysis becomes available.
    pub publish_delay_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSourceConfig {
    /// EDR API root, e.g. `https://example.org/edr`.
    pub base_url: String,
    pub collection: String,
    /// Largest accepted gap between requested and published analysis time.
    #[serde(default = "default_tolerance_minutes")]
    pub tolerance_minutes: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSourceConfig {
    /// METAR JSON endpoint.
    pub url: String,
    /// Reports older than this (relative to the valid time) are not requested.
    #[serde(default = "default_lookback_minutes")]
    pub lookback_minutes: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Pause before the single retry of a failed fetch. Zero is allowed.
    pub delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecimationConfig {
    /// Strides by effective span (square root of box area, degrees).
    pub steps: Vec<DecimationStep>,
    /// Stride for boxes wider than the last step.
    pub max_stride: usize,
    /// Applied when coarse sampling is requested.
    pub coarse_multiplier: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DecimationStep {
    /// Upper bound (exclusive) of the effective span for this stride.
    pub max_span_deg: f64,
    pub stride: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    pub bbox: BoundingBox,
    /// Minimum separation between plotted stations.
    pub mask_radius_km: f64,
    /// Smallest stride used for this region.
    #[serde(default = "default_decimation_base")]
    pub decimation_base: usize,
}

fn default_display_timezone() -> Tz {
    chrono_tz::UTC
}

fn default_observation_tolerance_minutes() -> u64 {
    60
}

fn default_tolerance_minutes() -> u64 {
    90
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_lookback_minutes() -> u64 {
    90
}

fn default_user_agent() -> String {
    format!("analysis-sync/{}", env!("CARGO_PKG_VERSION"))
}

fn default_decimation_base() -> usize {
    1
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cadence_minutes: 60,
            publish_delay_minutes: 30,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { delay_secs: 30 }
    }
}

impl Default for DecimationConfig {
    fn default() -> Self {
        let step = |max_span_deg, stride| DecimationStep {
            max_span_deg,
            stride,
        };
        Self {
            steps: vec![
                step(2.0, 1),
                step(5.0, 2),
                step(8.0, 3),
                step(12.0, 4),
                step(20.0, 6),
                step(30.0, 8),
                step(45.0, 10),
                step(70.0, 12),
            ],
            max_stride: 15,
            coarse_multiplier: 2,
        }
    }
}

impl GridSourceConfig {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            collection: collection.into(),
            tolerance_minutes: default_tolerance_minutes(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }

    pub fn tolerance(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.tolerance_minutes as i64)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl StationSourceConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            lookback_minutes: default_lookback_minutes(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }

    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.lookback_minutes as i64)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl SyncConfig {
    /// Configuration with defaults everywhere except the two endpoints.
    pub fn new(grid_source: GridSourceConfig, stations: StationSourceConfig) -> Self {
        Self {
            display_timezone: default_display_timezone(),
            schedule: ScheduleConfig::default(),
            grid_source,
            stations,
            retry: RetryConfig::default(),
            observation_tolerance_minutes: default_observation_tolerance_minutes(),
            decimation: DecimationConfig::default(),
            regions: BTreeMap::new(),
        }
    }

    pub fn observation_tolerance(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.observation_tolerance_minutes as i64)
    }

    /// Look up a region by id.
    pub fn region(&self, id: &str) -> WxResult<&RegionConfig> {
        self.regions
            .get(id)
            .ok_or_else(|| WxError::Config(format!("unknown region '{id}'")))
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load and validate the configuration file, expanding environment variables.
pub fn load_sync_config<P: AsRef<Path>>(path: P) -> Result<SyncConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read sync config from {:?}", path.as_ref()))?;

    parse_sync_config(&content)
        .with_context(|| format!("Invalid sync config in {:?}", path.as_ref()))
}

/// Parse and validate configuration from YAML text.
pub fn parse_sync_config(content: &str) -> Result<SyncConfig> {
    let expanded = expand_env_vars(content)?;

    let config: SyncConfig =
        serde_yaml::from_str(&expanded).context("Failed to parse sync config YAML")?;

    validate_sync_config(&config)?;

    Ok(config)
}

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_sync_config(config: &SyncConfig) -> Result<()> {
    anyhow::ensure!(
        config.schedule.cadence_minutes > 0,
        "Schedule cadence must be greater than 0"
    );

    anyhow::ensure!(
        !config.grid_source.base_url.is_empty(),
        "Grid source base_url cannot be empty"
    );
    anyhow::ensure!(
        !config.grid_source.collection.is_empty(),
        "Grid source collection cannot be empty"
    );
    anyhow::ensure!(
        config.grid_source.timeout_secs > 0,
        "Grid source timeout must be greater than 0"
    );

    anyhow::ensure!(!config.stations.url.is_empty(), "Station url cannot be empty");
    anyhow::ensure!(
        config.stations.timeout_secs > 0,
        "Station timeout must be greater than 0"
    );

    validate_decimation(&config.decimation)?;

    for (id, region) in &config.regions {
        region
            .bbox
            .validated()
            .with_context(|| format!("Region '{id}' has an invalid bbox"))?;
        anyhow::ensure!(
            region.mask_radius_km.is_finite() && region.mask_radius_km >= 0.0,
            "Region '{}' mask radius must be a non-negative distance, got {}",
            id,
            region.mask_radius_km
        );
        anyhow::ensure!(
            region.decimation_base >= 1,
            "Region '{}' decimation_base must be at least 1",
            id
        );
    }

    Ok(())
}

fn validate_decimation(config: &DecimationConfig) -> Result<()> {
    anyhow::ensure!(
        !config.steps.is_empty(),
        "Decimation table must have at least one step"
    );
    anyhow::ensure!(
        config.coarse_multiplier >= 1,
        "Decimation coarse_multiplier must be at least 1"
    );

    let mut previous: Option<&DecimationStep> = None;
    for step in &config.steps {
        anyhow::ensure!(
            step.max_span_deg.is_finite() && step.max_span_deg > 0.0,
            "Decimation step span must be positive, got {}",
            step.max_span_deg
        );
        anyhow::ensure!(step.stride >= 1, "Decimation stride must be at least 1");
        if let Some(prev) = previous {
            anyhow::ensure!(
                step.max_span_deg > prev.max_span_deg && step.stride >= prev.stride,
                "Decimation steps must be ordered by span with non-decreasing strides"
            );
        }
        previous = Some(step);
    }

    if let Some(last) = previous {
        anyhow::ensure!(
            config.max_stride >= last.stride,
            "Decimation max_stride {} is below the last step stride {}",
            config.max_stride,
            last.stride
        );
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
