//! Export command implementation
//!
//! This module implements the `export` command, which submits one export
//! task per (date interval, feature index) and keeps the number of active
//! remote tasks under the configured ceiling.

use super::{
    exit_code_for, RunArgs, EXIT_CONFIG, EXIT_INTERRUPTED, EXIT_PARTIAL, EXIT_SUCCESS,
};
use crate::adapters::earthengine::EarthEngineClient;
use crate::config::{load_config, GeeConfig};
use crate::core::export::{
    ExportParameters, ExportScheduler, ExportSummary, RunRequest, SchedulerSettings,
    SubmissionClient,
};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Destination folder (overrides export.folder)
    #[arg(long)]
    pub folder: Option<String>,

    /// Resolve and size every job without submitting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum active remote tasks (overrides export.max_concurrent_tasks)
    #[arg(long)]
    pub max_concurrent_tasks: Option<usize>,

    /// Seconds between task-status polls (overrides export.task_check_interval_secs)
    #[arg(long)]
    pub check_interval_secs: Option<u64>,
}

impl ExportArgs {
    /// Apply CLI overrides to the loaded configuration
    fn apply_overrides(&self, config: &mut GeeConfig) {
        if let Some(folder) = &self.folder {
            tracing::info!(folder = %folder, "Overriding destination folder from CLI");
            config.export.folder = folder.clone();
        }
        if let Some(ceiling) = self.max_concurrent_tasks {
            tracing::info!(ceiling = ceiling, "Overriding max concurrent tasks from CLI");
            config.export.max_concurrent_tasks = ceiling;
        }
        if let Some(secs) = self.check_interval_secs {
            tracing::info!(secs = secs, "Overriding task check interval from CLI");
            config.export.task_check_interval_secs = secs;
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                crate::log_error_with_context!(e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG);
        }

        let indices = match self.run.resolve_indices() {
            Ok(indices) => indices,
            Err(e) => {
                tracing::error!(error = %e, "Invalid target list");
                eprintln!("Invalid target list: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let dry_run = config.application.dry_run;
        if dry_run {
            tracing::info!("Dry run mode enabled - no export tasks will be created");
            println!("🔍 DRY RUN MODE - No export tasks will be created");
            println!();
        }

        let client = match EarthEngineClient::new(config.earthengine.clone(), config.sources.clone())
        {
            Ok(c) => Arc::new(c),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create Earth Engine client");
                eprintln!("Failed to initialize export: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let parameters = ExportParameters::from_config(&config, self.run.source);
        let submitter = SubmissionClient::new(client.clone(), client.clone(), parameters);
        let settings = SchedulerSettings {
            ceiling: config.export.max_concurrent_tasks,
            check_interval: Duration::from_secs(config.export.task_check_interval_secs),
            dry_run,
        };
        let mut scheduler = ExportScheduler::new(submitter, client, settings, shutdown_signal);

        let request = RunRequest {
            source: self.run.source,
            start: self.run.start.clone(),
            end: self.run.end.clone(),
            indices,
            folder: config.export.folder.clone(),
        };

        println!("🚀 Starting export...");
        println!();

        // The scheduler may sit in a drain wait for hours; keep it off the
        // task that services signals.
        let handle = tokio::spawn(async move { scheduler.run(request).await });
        let summary = match handle.await? {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        summary.log_summary();
        print_summary(&summary);

        Ok(exit_code(&summary))
    }
}

/// Exit code for a finished run
pub fn exit_code(summary: &ExportSummary) -> i32 {
    if let Some(abort) = &summary.aborted {
        exit_code_for(&abort.to_error())
    } else if summary.interrupted {
        EXIT_INTERRUPTED
    } else if summary.failed > 0 {
        EXIT_PARTIAL
    } else {
        EXIT_SUCCESS
    }
}

fn print_summary(summary: &ExportSummary) {
    println!();
    println!("📊 Export Summary:");
    println!("  Run ID: {}", summary.run_id);
    println!("  Source: {}", summary.source);
    println!("  Date Ranges: {}", summary.intervals);
    println!("  Indices: {}", summary.indices);
    println!("  Planned: {}", summary.planned);
    println!("  Submitted: {}", summary.submitted);
    println!("  Failed: {}", summary.failed);
    if summary.dry_run {
        println!("  Skipped (dry run): {}", summary.skipped);
    }
    println!("  Batches: {}", summary.batches);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", summary.success_rate());
    println!();

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in summary.errors.iter().take(10) {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        if summary.errors.len() > 10 {
            println!("  ... and {} more errors", summary.errors.len() - 10);
        }
        println!();
    }

    if let Some(abort) = &summary.aborted {
        println!("❌ Export {abort}");
        println!("   {} job(s) were not attempted.", summary.not_attempted());
        if summary.submitted > 0 {
            println!("   Tasks already submitted keep running remotely.");
        }
    } else if summary.interrupted {
        println!("⚠️  Export interrupted. {} job(s) were not attempted.", summary.not_attempted());
        println!("   Tasks already submitted keep running remotely.");
    } else if summary.dry_run {
        println!("✅ Dry run completed!");
    } else if summary.failed > 0 {
        println!("⚠️  Export completed with failures");
    } else {
        println!("✅ Export completed successfully!");
    }
}
