//! Integration tests for configuration loading and validation
//!
//! Tests that touch environment variables hold `ENV_MUTEX` so they don't
//! interfere with each other.

use geexport::config::{load_config, load_target_file};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    std::env::remove_var("GEEXPORT_APPLICATION_DRY_RUN");
    std::env::remove_var("GEEXPORT_EXPORT_MAX_CONCURRENT_TASKS");
    std::env::remove_var("GEEXPORT_EXPORT_FOLDER");
    std::env::remove_var("GEEXPORT_EARTHENGINE_PROJECT");
    std::env::remove_var("TEST_EE_TOKEN");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

const MINIMAL: &str = r#"
[earthengine]
project = "forest-watch"
access_token = "ya29.static"
feature_asset_id = "projects/forest-watch/assets/parcels"
"#;

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"
dry_run = true

[earthengine]
base_url = "https://ee.example.com"
project = "forest-watch"
access_token = "ya29.static"
feature_asset_id = "projects/forest-watch/assets/parcels"
index_property = "ParcelId"
timeout_seconds = 120

[earthengine.retry]
max_retries = 5
initial_delay_ms = 500
max_delay_ms = 8000
backoff_multiplier = 1.5

[sources.nicfi]
collection_id = "projects/planet-nicfi/assets/basemaps/africa"
scale_meters = 4

[sources.sentinel]
collection_id = "COPERNICUS/S2_SR"
scale_meters = 20

[export]
max_concurrent_tasks = 1500
task_check_interval_secs = 300
max_pixels = 1000000000
crs = "EPSG:3857"
folder = "parcels-2024"
file_format = "TF_RECORD_IMAGE"

[logging]
local_enabled = true
local_path = "/tmp/geexport"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);

    assert_eq!(config.earthengine.base_url, "https://ee.example.com");
    assert_eq!(config.earthengine.project, "forest-watch");
    assert_eq!(config.earthengine.access_token.expose_secret(), "ya29.static");
    assert_eq!(config.earthengine.index_property, "ParcelId");
    assert_eq!(config.earthengine.timeout_seconds, 120);
    assert_eq!(config.earthengine.retry.max_retries, 5);
    assert_eq!(config.earthengine.retry.backoff_multiplier, 1.5);

    assert_eq!(
        config.sources.nicfi.collection_id,
        "projects/planet-nicfi/assets/basemaps/africa"
    );
    assert_eq!(config.sources.nicfi.scale_meters, 4);
    assert_eq!(config.sources.sentinel.scale_meters, 20);

    assert_eq!(config.export.max_concurrent_tasks, 1500);
    assert_eq!(config.export.task_check_interval_secs, 300);
    assert_eq!(config.export.max_pixels, 1_000_000_000);
    assert_eq!(config.export.crs, "EPSG:3857");
    assert_eq!(config.export.folder, "parcels-2024");
    assert_eq!(config.export.file_format, "TF_RECORD_IMAGE");

    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(MINIMAL);
    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.earthengine.base_url, "https://earthengine.googleapis.com");
    assert_eq!(config.earthengine.index_property, "Index");
    assert_eq!(config.sources.nicfi.scale_meters, 5);
    assert_eq!(config.sources.sentinel.scale_meters, 10);
    assert_eq!(
        config.sources.sentinel.collection_id,
        "COPERNICUS/S2_SR_HARMONIZED"
    );
    assert_eq!(config.export.max_concurrent_tasks, 2000);
    assert_eq!(config.export.task_check_interval_secs, 600);
    assert_eq!(config.export.max_pixels, 10_000_000_000_000);
    assert_eq!(config.export.crs, "EPSG:4326");
    assert_eq!(config.export.file_format, "GEO_TIFF");
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_EE_TOKEN", "ya29.from-env");

    let file = write_config(
        r#"
[earthengine]
project = "forest-watch"
access_token = "${TEST_EE_TOKEN}"
feature_asset_id = "projects/forest-watch/assets/parcels"
"#,
    );
    let config = load_config(file.path()).expect("Failed to load config");
    assert_eq!(
        config.earthengine.access_token.expose_secret(),
        "ya29.from-env"
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_fails() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[earthengine]
project = "forest-watch"
access_token = "${TEST_EE_TOKEN}"
feature_asset_id = "projects/forest-watch/assets/parcels"
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_EE_TOKEN"));
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("GEEXPORT_EXPORT_MAX_CONCURRENT_TASKS", "250");
    std::env::set_var("GEEXPORT_EXPORT_FOLDER", "override-folder");
    std::env::set_var("GEEXPORT_APPLICATION_DRY_RUN", "true");
    std::env::set_var("GEEXPORT_EARTHENGINE_PROJECT", "other-project");

    let file = write_config(MINIMAL);
    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.export.max_concurrent_tasks, 250);
    assert_eq!(config.export.folder, "override-folder");
    assert!(config.application.dry_run);
    assert_eq!(config.earthengine.project, "other-project");

    cleanup_env_vars();
}

#[test]
fn test_override_out_of_range_fails_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("GEEXPORT_EXPORT_MAX_CONCURRENT_TASKS", "5000");

    let file = write_config(MINIMAL);
    let result = load_config(file.path());

    cleanup_env_vars();
    let err = result.unwrap_err();
    assert!(err.to_string().contains("max_concurrent_tasks"));
}

#[test]
fn test_invalid_config_values() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let cases = [
        // asset id outside a project
        r#"
[earthengine]
project = "p"
access_token = "t"
feature_asset_id = "users/me/parcels"
"#,
        // unusable base url
        r#"
[earthengine]
base_url = "ftp://ee.example.com"
project = "p"
access_token = "t"
feature_asset_id = "projects/p/assets/parcels"
"#,
        // zero poll interval
        r#"
[earthengine]
project = "p"
access_token = "t"
feature_asset_id = "projects/p/assets/parcels"

[export]
task_check_interval_secs = 0
"#,
        // unknown rotation
        r#"
[earthengine]
project = "p"
access_token = "t"
feature_asset_id = "projects/p/assets/parcels"

[logging]
local_rotation = "weekly"
"#,
    ];

    for contents in cases {
        let file = write_config(contents);
        assert!(
            load_config(file.path()).is_err(),
            "expected failure for:\n{contents}"
        );
    }
}

#[test]
fn test_missing_file() {
    let result = load_config("/nonexistent/geexport.toml");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("not found"));
}

#[test]
fn test_target_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Index,Area_ha,Name").unwrap();
    writeln!(file, "101,3.2,north").unwrap();
    writeln!(file, "\"102\",0.4,south").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "101,3.2,north").unwrap();
    writeln!(file, "7.0,12.9,east").unwrap();

    let indices = load_target_file(file.path()).unwrap();
    let values: Vec<i64> = indices.iter().map(|i| i.value()).collect();
    assert_eq!(values, vec![101, 102, 7]);
}
