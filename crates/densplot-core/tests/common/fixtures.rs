//! Test fixture loading utilities

use std::path::PathBuf;

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a fixture file as a string
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Load and parse a JSON fixture
#[allow(dead_code)]
pub fn load_json<T: serde::de::DeserializeOwned>(name: &str) -> T {
    serde_json::from_str(&load_fixture(name))
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", name, e))
}
