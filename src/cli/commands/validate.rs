//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the geexport configuration file.

use super::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::load_config;
use crate::domain::SourceKind;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after parsing and applying overrides
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Earth Engine: {}", config.earthengine.base_url);
        println!("  Project: {}", config.earthengine.project);
        println!("  Feature Asset: {}", config.earthengine.feature_asset_id);
        println!("  Index Property: {}", config.earthengine.index_property);
        for kind in SourceKind::ALL {
            let source = config.sources.get(kind);
            println!(
                "  Source {kind}: {} @ {} m",
                source.collection_id, source.scale_meters
            );
        }
        println!("  Max Concurrent Tasks: {}", config.export.max_concurrent_tasks);
        println!(
            "  Task Check Interval: {}s",
            config.export.task_check_interval_secs
        );
        println!("  Folder: {}", config.export.folder);
        println!("  CRS: {}", config.export.crs);
        println!("  File Format: {}", config.export.file_format);
        println!();
        Ok(EXIT_SUCCESS)
    }
}
