//! Analysis acquisition and synchronization.
//!
//! Picks the analysis valid time(s) for a product, acquires the gridded
//! fields (and station reports for overlay products) with a single bounded
//! retry, thins stations to a minimum separation and chooses a sample stride
//! for the map box. The result is one [`SyncedBundle`] per request.
//!
//! # Example
//!
//! ```no_run
//! use analysis_sync::{load_sync_config, ProductKind, SyncEngine, SyncRequest};
//!
//! let config = load_sync_config("config/analysis-sync.yaml")?;
//! let engine = SyncEngine::from_config(&config)?;
//! let region = config.region("california")?;
//! let request = SyncRequest::for_region(ProductKind::StationOverlay, ["TMP"], region);
//! let bundle = engine.build(&request, chrono::Utc::now(), None)?;
//! println!("stride {}", bundle.stride);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod acquire;
pub mod config;
pub mod decimate;
pub mod engine;
pub mod fetch;
mod http;
pub mod mask;
pub mod request;
pub mod resolver;
pub mod stations;
pub mod style;

pub use acquire::{AcquirePlan, Acquired, BundleSource, RetryingAcquirer, SuppliedData};
pub use config::{load_sync_config, parse_sync_config, RegionConfig, SyncConfig};
pub use decimate::{DecimationFactor, Decimator};
pub use engine::{StaleObservationMismatch, StationSample, SyncEngine, SyncedBundle};
pub use fetch::{EdrGridSource, GridSource};
pub use request::{ProductKind, SyncRequest};
pub use resolver::{TimeResolver, COMPARISON_LAG_HOURS};
pub use stations::{MetarSource, StationSource};
pub use style::SampleStyle;
