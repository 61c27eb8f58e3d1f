//! Configuration schema types
//!
//! This module defines the configuration structure for geexport.

use crate::config::SecretString;
use crate::domain::SourceKind;
use serde::{Deserialize, Serialize};

/// Upper bound for the concurrency ceiling accepted in configuration
pub const MAX_CEILING: usize = 3000;

/// Main geexport configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Earth Engine connection settings
    pub earthengine: EarthEngineConfig,

    /// Per-source imagery settings
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Export and scheduling settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GeeConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.earthengine.validate()?;
        self.sources.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (plan and size jobs, submit nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Retry configuration for individual HTTP calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(format!(
                "earthengine.retry.max_retries must be between 1 and 10, got {}",
                self.max_retries
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "earthengine.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(
                "earthengine.retry.initial_delay_ms cannot exceed max_delay_ms".to_string(),
            );
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Earth Engine connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarthEngineConfig {
    /// REST API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Cloud project that owns the export tasks
    pub project: String,

    /// OAuth access token sent as a bearer token
    /// Stored securely in memory and automatically zeroized on drop
    pub access_token: SecretString,

    /// Asset id of the shared feature collection
    pub feature_asset_id: String,

    /// Feature property holding the integer index
    #[serde(default = "default_index_property")]
    pub index_property: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl EarthEngineConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("earthengine.base_url is not a valid URL: {e}"))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err("earthengine.base_url must start with http:// or https://".to_string());
        }

        if self.project.trim().is_empty() {
            return Err("earthengine.project cannot be empty".to_string());
        }

        if self.access_token.expose_secret().is_empty() {
            return Err("earthengine.access_token cannot be empty".to_string());
        }

        if !self.feature_asset_id.starts_with("projects/") {
            return Err(format!(
                "earthengine.feature_asset_id must start with 'projects/', got '{}'",
                self.feature_asset_id
            ));
        }

        if self.index_property.trim().is_empty() {
            return Err("earthengine.index_property cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("earthengine.timeout_seconds must be > 0".to_string());
        }

        self.retry.validate()?;
        Ok(())
    }
}

/// Imagery settings for one source kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Image collection id
    pub collection_id: String,

    /// Export pixel size in meters
    pub scale_meters: u32,
}

impl SourceConfig {
    /// Built-in settings for a source kind
    pub fn for_kind(kind: SourceKind) -> Self {
        Self {
            collection_id: kind.default_collection_id().to_string(),
            scale_meters: kind.default_scale_meters(),
        }
    }

    fn validate(&self, kind: SourceKind) -> Result<(), String> {
        if self.collection_id.trim().is_empty() {
            return Err(format!("sources.{kind}.collection_id cannot be empty"));
        }
        if self.scale_meters == 0 {
            return Err(format!("sources.{kind}.scale_meters must be > 0"));
        }
        Ok(())
    }
}

/// Settings for every source kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Monthly basemap source
    #[serde(default = "default_nicfi")]
    pub nicfi: SourceConfig,

    /// Sub-monthly source
    #[serde(default = "default_sentinel")]
    pub sentinel: SourceConfig,
}

impl SourcesConfig {
    /// Settings for `kind`
    pub fn get(&self, kind: SourceKind) -> &SourceConfig {
        match kind {
            SourceKind::Nicfi => &self.nicfi,
            SourceKind::Sentinel => &self.sentinel,
        }
    }

    fn validate(&self) -> Result<(), String> {
        for kind in SourceKind::ALL {
            self.get(kind).validate(kind)?;
        }
        Ok(())
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            nicfi: default_nicfi(),
            sentinel: default_sentinel(),
        }
    }
}

/// Export and scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Account-wide ceiling of active remote tasks
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,

    /// Seconds between active-task polls while draining
    #[serde(default = "default_task_check_interval_secs")]
    pub task_check_interval_secs: u64,

    /// Pixel-count ceiling per export
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,

    /// Output coordinate reference system
    #[serde(default = "default_crs")]
    pub crs: String,

    /// Destination folder in cloud storage
    #[serde(default = "default_folder")]
    pub folder: String,

    /// Output file format
    #[serde(default = "default_file_format")]
    pub file_format: String,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_CEILING).contains(&self.max_concurrent_tasks) {
            return Err(format!(
                "export.max_concurrent_tasks must be between 1 and {MAX_CEILING}, got {}",
                self.max_concurrent_tasks
            ));
        }
        if self.task_check_interval_secs == 0 {
            return Err("export.task_check_interval_secs must be > 0".to_string());
        }
        if self.max_pixels == 0 {
            return Err("export.max_pixels must be > 0".to_string());
        }
        if !self.crs.contains(':') {
            return Err(format!(
                "export.crs must look like 'EPSG:4326', got '{}'",
                self.crs
            ));
        }
        if self.folder.trim().is_empty() {
            return Err("export.folder cannot be empty".to_string());
        }
        let valid_formats = ["GEO_TIFF", "TF_RECORD_IMAGE"];
        if !valid_formats.contains(&self.file_format.as_str()) {
            return Err(format!(
                "Invalid export.file_format '{}'. Must be one of: {}",
                self.file_format,
                valid_formats.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: default_max_concurrent_tasks(),
            task_check_interval_secs: default_task_check_interval_secs(),
            max_pixels: default_max_pixels(),
            crs: default_crs(),
            folder: default_folder(),
            file_format: default_file_format(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://earthengine.googleapis.com".to_string()
}

fn default_index_property() -> String {
    "Index".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_nicfi() -> SourceConfig {
    SourceConfig::for_kind(SourceKind::Nicfi)
}

fn default_sentinel() -> SourceConfig {
    SourceConfig::for_kind(SourceKind::Sentinel)
}

fn default_max_concurrent_tasks() -> usize {
    2000
}

fn default_task_check_interval_secs() -> u64 {
    600
}

fn default_max_pixels() -> u64 {
    10_000_000_000_000
}

fn default_crs() -> String {
    "EPSG:4326".to_string()
}

fn default_folder() -> String {
    "geexport".to_string()
}

fn default_file_format() -> String {
    "GEO_TIFF".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
