//! External system integrations for geexport.
//!
//! - [`earthengine`] - Earth Engine feature lookup, export submission and
//!   task listing
//!
//! # Design Pattern
//!
//! Adapters isolate the remote service behind the [`FeatureSource`] and
//! [`ExportService`] traits so the scheduler can run against mock
//! implementations.
//!
//! ```rust,no_run
//! use geexport::adapters::earthengine::{EarthEngineClient, ExportService};
//! use geexport::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("geexport.toml")?;
//! let client = EarthEngineClient::new(config.earthengine, config.sources)?;
//! println!("Active tasks: {}", client.active_task_count().await?);
//! # Ok(())
//! # }
//! ```
//!
//! [`FeatureSource`]: earthengine::FeatureSource
//! [`ExportService`]: earthengine::ExportService

pub mod earthengine;
