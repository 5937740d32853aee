//! Tests for loading configuration files.

use analysis_sync::{load_sync_config, ProductKind, SyncRequest};
use test_utils::{configs, regions, sample_config_path, write_temp_file};
use wx_common::WxError;

#[test]
fn test_load_sample_config() {
    let config = load_sync_config(sample_config_path()).expect("sample config loads");

    assert!(!config.grid_source.base_url.is_empty());
    assert!(config.stations.url.starts_with("http"));
    assert_eq!(config.schedule.cadence_minutes, 60);
    assert_eq!(config.decimation.max_stride, 15);

    let california = config.region("california").unwrap();
    assert_eq!(california.bbox, regions::CALIFORNIA);
    for id in ["bay_area", "pacific_northwest", "southwest", "conus"] {
        assert!(config.region(id).is_ok(), "missing region {id}");
    }
}

#[test]
fn test_sample_regions_build_requests() {
    let config = load_sync_config(sample_config_path()).unwrap();
    for (id, region) in &config.regions {
        let request = SyncRequest::for_region(ProductKind::StationOverlay, ["TMP"], region);
        assert_eq!(request.mask_radius_km, Some(region.mask_radius_km), "{id}");
        assert!(request.decimation_base >= 1);
    }
}

#[test]
fn test_load_from_file() {
    let (_dir, path) = write_temp_file("sync.yaml", configs::REGIONS_YAML);
    let config = load_sync_config(&path).unwrap();

    assert_eq!(config.display_timezone, chrono_tz::America::Los_Angeles);
    assert_eq!(config.schedule.publish_delay_minutes, 0);
    assert_eq!(config.retry.delay_secs, 0);
    assert_eq!(config.regions.len(), 2);
    assert_eq!(config.region("conus").unwrap().decimation_base, 2);
}

#[test]
fn test_defaults_fill_missing_sections() {
    let (_dir, path) = write_temp_file("sync.yaml", configs::MINIMAL_YAML);
    let config = load_sync_config(&path).unwrap();

    assert_eq!(config.display_timezone, chrono_tz::UTC);
    assert_eq!(config.schedule.cadence_minutes, 60);
    assert_eq!(config.schedule.publish_delay_minutes, 30);
    assert_eq!(config.grid_source.tolerance_minutes, 90);
    assert_eq!(config.stations.lookback_minutes, 90);
    assert_eq!(config.retry.delay_secs, 30);
    assert_eq!(config.observation_tolerance_minutes, 60);
    assert!(config.regions.is_empty());
}

#[test]
fn test_env_substitution_in_file() {
    std::env::set_var("ANALYSIS_SYNC_TEST_COLLECTION", "urma-conus");
    let yaml = configs::MINIMAL_YAML.replace("rtma-conus", "${ANALYSIS_SYNC_TEST_COLLECTION}");
    let (_dir, path) = write_temp_file("sync.yaml", &yaml);

    let config = load_sync_config(&path).unwrap();
    assert_eq!(config.grid_source.collection, "urma-conus");
}

#[test]
fn test_missing_file_errors() {
    let (dir, _path) = write_temp_file("present.yaml", "");
    let err = load_sync_config(dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read sync config"), "{err:#}");
}

#[test]
fn test_invalid_region_reports_file() {
    let yaml = format!(
        "{}regions:\n  bad:\n    bbox: {{west: -114.0, east: -125.0, south: 32.0, north: 42.0}}\n    mask_radius_km: 10.0\n",
        configs::MINIMAL_YAML
    );
    let (_dir, path) = write_temp_file("sync.yaml", &yaml);

    let err = load_sync_config(&path).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("Invalid sync config"), "{chain}");
    assert!(chain.contains("Region 'bad'"), "{chain}");
}

#[test]
fn test_unknown_region_is_config_error() {
    let (_dir, path) = write_temp_file("sync.yaml", configs::REGIONS_YAML);
    let config = load_sync_config(&path).unwrap();
    assert!(matches!(config.region("atlantis"), Err(WxError::Config(_))));
}
