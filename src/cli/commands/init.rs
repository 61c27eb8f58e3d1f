//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "geexport.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing geexport configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set [earthengine] project and feature_asset_id in {}", self.output);
                println!("  2. Put an OAuth access token in EE_ACCESS_TOKEN (or a .env file)");
                println!("  3. Validate configuration: geexport validate-config");
                println!("  4. Preview a run: geexport plan --source nicfi --start 2024-01-01 --end 2024-04-01 --indices 1,2");
                println!("  5. Run export: geexport export --source nicfi --start 2024-01-01 --end 2024-04-01 --indices 1,2");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# geexport configuration

[application]
log_level = "info"
dry_run = false

[earthengine]
project = "my-gee-project"
access_token = "${EE_ACCESS_TOKEN}"
feature_asset_id = "projects/my-gee-project/assets/features"
index_property = "Index"

[export]
max_concurrent_tasks = 2000
task_check_interval_secs = 600
folder = "geexport"

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# geexport configuration
#
# Every value can also be set through GEEXPORT_<SECTION>_<KEY> environment
# variables, e.g. GEEXPORT_EXPORT_MAX_CONCURRENT_TASKS=1500.
# ${VAR} references are replaced from the environment before parsing.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
log_level = "info"

# Resolve and size jobs without creating any export task
dry_run = false

# ============================================================================
# Earth Engine Connection
# ============================================================================
[earthengine]
# REST endpoint
base_url = "https://earthengine.googleapis.com"

# Cloud project that owns the export tasks
project = "my-gee-project"

# OAuth2 access token (use an environment variable)
access_token = "${EE_ACCESS_TOKEN}"

# Feature collection holding the target polygons
feature_asset_id = "projects/my-gee-project/assets/features"

# Integer property that identifies a feature
index_property = "Index"

# Per-request timeout in seconds
timeout_seconds = 60

# Retries for transient failures (connection, timeout, 429, 5xx)
[earthengine.retry]
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Imagery Sources
# ============================================================================
# Monthly basemaps
[sources.nicfi]
collection_id = "projects/planet-nicfi/assets/basemaps/americas"
scale_meters = 5

# Sub-monthly composites (1-10, 11-20, 21-end of month)
[sources.sentinel]
collection_id = "COPERNICUS/S2_SR_HARMONIZED"
scale_meters = 10

# ============================================================================
# Export Scheduling
# ============================================================================
[export]
# Active remote tasks allowed before submission pauses (1-3000)
max_concurrent_tasks = 2000

# Seconds between task-status polls while waiting for capacity
task_check_interval_secs = 600

# Pixel-count ceiling per export
max_pixels = 10000000000000

# Output projection
crs = "EPSG:4326"

# Drive folder receiving the files
folder = "geexport"

# GEO_TIFF or TF_RECORD_IMAGE
file_format = "GEO_TIFF"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Write JSON logs to local files
local_enabled = false

# Directory for log files
local_path = "./logs"

# Log rotation (daily, hourly, never)
local_rotation = "daily"
"#
        .to_string()
    }
}
