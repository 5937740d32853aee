//! Common fixtures: regions and canned catalog / feed payloads.

/// Region extents used across the tests.
pub mod regions {
    use wx_common::BoundingBox;

    pub const CALIFORNIA: BoundingBox = BoundingBox {
        west: -125.0,
        east: -114.0,
        south: 32.0,
        north: 42.0,
    };

    /// Continental United States.
    pub const CONUS: BoundingBox = BoundingBox {
        west: -125.0,
        east: -66.0,
        south: 24.0,
        north: 50.0,
    };

    pub const NORTHERN_HEMISPHERE: BoundingBox = BoundingBox {
        west: -180.0,
        east: 180.0,
        south: 0.0,
        north: 90.0,
    };

    /// Roughly a single county.
    pub const BAY_AREA: BoundingBox = BoundingBox {
        west: -122.6,
        east: -121.8,
        south: 37.3,
        north: 38.0,
    };

    /// Zero width.
    pub const DEGENERATE: BoundingBox = BoundingBox {
        west: -100.0,
        east: -100.0,
        south: 30.0,
        north: 40.0,
    };

    /// West edge east of the east edge.
    pub const INVERTED: BoundingBox = BoundingBox {
        west: -114.0,
        east: -125.0,
        south: 32.0,
        north: 42.0,
    };
}

/// Canned JSON payloads.
pub mod payloads {
    /// `GET /collections/rtma-conus` with hourly analyses 06Z-12Z on 2024-06-01.
    pub const COLLECTION_JSON: &str = r#"{
        "id": "rtma-conus",
        "title": "RTMA 2.5 km analysis",
        "extent": {
            "spatial": {"bbox": [[-134.1, 21.1, -60.9, 52.6]], "crs": "CRS:84"},
            "temporal": {
                "interval": [["2024-06-01T06:00:00Z", "2024-06-01T12:00:00Z"]],
                "values": [
                    "2024-06-01T06:00:00Z", "2024-06-01T07:00:00Z", "2024-06-01T08:00:00Z",
                    "2024-06-01T09:00:00Z", "2024-06-01T10:00:00Z", "2024-06-01T11:00:00Z",
                    "2024-06-01T12:00:00Z"
                ]
            }
        },
        "parameter_names": {
            "TMP": {"type": "Parameter", "unit": {"symbol": "K"}},
            "DPT": {"type": "Parameter", "unit": {"symbol": "K"}}
        }
    }"#;

    /// Cube response for TMP and DPT at 2024-06-01T12:00Z, 3x2 grid over
    /// California with a missing DPT cell.
    pub const CUBE_JSON: &str = r#"{
        "type": "Coverage",
        "domain": {
            "type": "Domain",
            "domainType": "Grid",
            "axes": {
                "x": {"start": -125.0, "stop": -114.0, "num": 3},
                "y": {"values": [32.0, 42.0]},
                "t": {"values": ["2024-06-01T12:00:00Z"]}
            }
        },
        "parameters": {
            "TMP": {"type": "Parameter", "unit": {"symbol": "K"}},
            "DPT": {"type": "Parameter", "unit": {"symbol": {"value": "K", "type": "http://www.opengis.net/def/uom/UCUM/"}}}
        },
        "ranges": {
            "TMP": {
                "type": "NdArray",
                "dataType": "float",
                "axisNames": ["t", "y", "x"],
                "shape": [1, 2, 3],
                "values": [295.1, 297.4, 301.0, 285.2, 288.9, 290.3]
            },
            "DPT": {
                "type": "NdArray",
                "dataType": "float",
                "axisNames": ["t", "y", "x"],
                "shape": [1, 2, 3],
                "values": [280.0, null, 275.5, 278.1, 276.0, 270.2]
            }
        }
    }"#;

    /// METAR feed around 2024-06-01T12:00Z.
    pub const METAR_JSON: &str = r#"[
        {"icaoId": "KSFO", "obsTime": 1717243200, "lat": 37.619, "lon": -122.365,
         "temp": 15.6, "dewp": 10.0, "wdir": 280, "wspd": 12, "visib": "10+", "altim": 1015.2},
        {"icaoId": "KOAK", "obsTime": 1717242780, "lat": 37.721, "lon": -122.221,
         "temp": 14.0, "dewp": 9.0, "wdir": "VRB", "wspd": 3, "visib": 10},
        {"icaoId": "KLAX", "obsTime": 1717243200, "lat": 33.938, "lon": -118.389,
         "temp": 18.3, "dewp": 12.2, "wdir": 250, "wspd": 8, "visib": 10}
    ]"#;
}

/// Configuration snippets.
pub mod configs {
    /// Smallest configuration that loads: endpoints only.
    pub const MINIMAL_YAML: &str = r#"
grid_source:
  base_url: http://localhost:8083/edr
  collection: rtma-conus
stations:
  url: http://localhost:9000/api/data/metar
"#;

    /// Two regions, no retry delay.
    pub const REGIONS_YAML: &str = r#"
display_timezone: America/Los_Angeles
schedule:
  cadence_minutes: 60
  publish_delay_minutes: 0
grid_source:
  base_url: http://localhost:8083/edr
  collection: rtma-conus
stations:
  url: http://localhost:9000/api/data/metar
retry:
  delay_secs: 0
observation_tolerance_minutes: 60
regions:
  california:
    bbox: {west: -125.0, east: -114.0, south: 32.0, north: 42.0}
    mask_radius_km: 50.0
    decimation_base: 1
  conus:
    bbox: {west: -125.0, east: -66.0, south: 24.0, north: 50.0}
    mask_radius_km: 150.0
    decimation_base: 2
"#;
}
