//! Workspace paths and temporary files for tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root: two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Path to the checked-in sample configuration.
pub fn sample_config_path() -> PathBuf {
    workspace_root().join("config").join("analysis-sync.yaml")
}

/// Scratch directory, removed when the `TempDir` drops.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Writes `contents` to `name` inside a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the file is needed.
pub fn write_temp_file(name: &str, contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = temp_test_dir();
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write temporary test file");
    (dir, path)
}
