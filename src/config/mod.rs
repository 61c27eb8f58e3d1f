//! Configuration management for geexport.
//!
//! # Overview
//!
//! geexport uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `GEEXPORT_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use geexport::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("geexport.toml")?;
//!
//! println!("Project: {}", config.earthengine.project);
//! println!("Ceiling: {}", config.export.max_concurrent_tasks);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry run
//! - [`EarthEngineConfig`] - Service endpoint, project, credentials, feature asset
//! - [`SourcesConfig`] - Collection id and scale per source kind
//! - [`ExportConfig`] - Concurrency ceiling, poll interval, export parameters
//! - [`LoggingConfig`] - Local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [earthengine]
//! project = "my-project"
//! access_token = "${GEE_ACCESS_TOKEN}"
//! feature_asset_id = "projects/my-project/assets/parcels"
//!
//! [export]
//! max_concurrent_tasks = 2000
//! task_check_interval_secs = 600
//! folder = "parcel_exports"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;
pub mod targets;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, EarthEngineConfig, ExportConfig, GeeConfig, LoggingConfig, RetryConfig,
    SourceConfig, SourcesConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
pub use targets::{load_target_file, parse_index_list, parse_target_csv};
