//! Plan command implementation
//!
//! Prints the date intervals, their file-name labels and the total job count
//! of a run. Nothing is sent to the remote service.

use super::{RunArgs, EXIT_CONFIG, EXIT_SUCCESS};
use crate::core::partition::partition;
use crate::core::region::date_label;
use crate::domain::{DateInterval, SourceKind};
use clap::Args;

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub run: RunArgs,
}

/// One row of the plan table
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRow {
    /// Date interval
    pub interval: DateInterval,
    /// Label used in file names and task descriptions
    pub label: String,
    /// Days the interval covers
    pub days: i64,
}

/// Planned intervals with their labels
pub fn plan_rows(intervals: &[DateInterval], source: SourceKind) -> Vec<PlanRow> {
    intervals
        .iter()
        .map(|interval| PlanRow {
            interval: *interval,
            label: date_label(interval, source),
            days: interval.num_days(),
        })
        .collect()
}

impl PlanArgs {
    /// Execute the plan command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let source = self.run.source;
        tracing::info!(source = %source, "Planning export run");

        let intervals = match partition(&self.run.start, &self.run.end, source) {
            Ok(intervals) => intervals,
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let indices = match self.run.resolve_indices() {
            Ok(indices) => indices,
            Err(e) => {
                println!("❌ Invalid target list: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let rows = plan_rows(&intervals, source);

        println!("🗓️  Export plan ({source})");
        println!();
        println!(
            "{:<5} {:<12} {:<12} {:<6} {:<10}",
            "#", "Start", "End", "Days", "Label"
        );
        println!("{}", "-".repeat(49));
        for (i, row) in rows.iter().enumerate() {
            println!(
                "{:<5} {:<12} {:<12} {:<6} {:<10}",
                i + 1,
                row.interval.start(),
                row.interval.end(),
                row.days,
                row.label
            );
        }
        println!();
        println!("  Date Ranges: {}", rows.len());
        println!("  Indices: {}", indices.len());
        println!("  Total Planned: {}", rows.len() * indices.len());
        println!();

        Ok(EXIT_SUCCESS)
    }
}
