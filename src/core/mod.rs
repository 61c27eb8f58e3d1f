//! Core business logic for geexport.
//!
//! # Modules
//!
//! - [`partition`] - Splitting a date range into per-source composite windows
//! - [`region`] - Sizing a feature's export rectangle
//! - [`export`] - Job submission, batch scheduling, and run summaries
//!
//! # Export Workflow
//!
//! 1. **Plan**: Partition the date range and count `intervals x indices` jobs
//! 2. **Handshake**: List remote tasks once to confirm the service is reachable
//! 3. **Resolve**: Build the composite image for each interval
//! 4. **Submit**: Look up, size, create and start each job in order
//! 5. **Drain**: Poll the active-task count whenever a batch hits the ceiling
//! 6. **Report**: Summarize planned, submitted and failed jobs
//!
//! # Example
//!
//! ```rust,no_run
//! use geexport::adapters::earthengine::EarthEngineClient;
//! use geexport::config::load_config;
//! use geexport::core::export::{
//!     ExportParameters, ExportScheduler, RunRequest, SchedulerSettings, SubmissionClient,
//! };
//! use geexport::domain::{FeatureIndex, SourceKind};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("geexport.toml")?;
//! let client = Arc::new(EarthEngineClient::new(
//!     config.earthengine.clone(),
//!     config.sources.clone(),
//! )?);
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let parameters = ExportParameters::from_config(&config, SourceKind::Nicfi);
//! let submitter = SubmissionClient::new(client.clone(), client.clone(), parameters);
//! let settings = SchedulerSettings {
//!     ceiling: config.export.max_concurrent_tasks,
//!     check_interval: Duration::from_secs(config.export.task_check_interval_secs),
//!     dry_run: false,
//! };
//! let mut scheduler = ExportScheduler::new(submitter, client, settings, shutdown_rx);
//!
//! let summary = scheduler
//!     .run(RunRequest {
//!         source: SourceKind::Nicfi,
//!         start: "2024-01-01".to_string(),
//!         end: "2024-04-01".to_string(),
//!         indices: vec![FeatureIndex::new(1), FeatureIndex::new(2)],
//!         folder: config.export.folder.clone(),
//!     })
//!     .await?;
//!
//! println!("Submitted {} of {}", summary.submitted, summary.planned);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod partition;
pub mod region;
