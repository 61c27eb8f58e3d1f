//! Status command implementation
//!
//! This module implements the `status` command, which shows how many
//! account-wide export tasks are active compared with the ceiling.

use super::{EXIT_CONFIG, EXIT_CONNECTION, EXIT_SUCCESS};
use crate::adapters::earthengine::{EarthEngineClient, ExportService};
use crate::config::load_config;
use crate::domain::{RemoteTaskHandle, TaskState};
use clap::Args;
use std::collections::BTreeMap;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// List each active task
    #[arg(long)]
    pub verbose: bool,
}

/// Task counts per state, in a stable order
pub fn count_by_state(tasks: &[RemoteTaskHandle]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for task in tasks {
        *counts.entry(task.state.as_str()).or_insert(0) += 1;
    }
    counts
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking remote task status");

        println!("📊 Export Task Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let client = match EarthEngineClient::new(config.earthengine.clone(), config.sources.clone())
        {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to create Earth Engine client");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let tasks = match client.list_tasks().await {
            Ok(tasks) => tasks,
            Err(e) => {
                println!("❌ Failed to list export tasks");
                println!("   Error: {e}");
                return Ok(EXIT_CONNECTION);
            }
        };

        let ceiling = config.export.max_concurrent_tasks;
        let active: Vec<&RemoteTaskHandle> =
            tasks.iter().filter(|t| t.state.is_active()).collect();

        println!("  Project: {}", config.earthengine.project);
        println!("  Active: {} / {}", active.len(), ceiling);
        println!("  Available: {}", ceiling.saturating_sub(active.len()));
        println!();

        for (state, count) in count_by_state(&tasks) {
            println!("  {state:<10} {count}");
        }
        println!();

        if self.verbose && !active.is_empty() {
            println!("{:<40} {:<10} {:<40}", "Task ID", "State", "Description");
            println!("{}", "-".repeat(92));
            for task in &active {
                let marker = if task.state == TaskState::Running {
                    "🔄"
                } else {
                    "⏳"
                };
                println!(
                    "{:<40} {marker} {:<8} {:<40}",
                    task.id.as_str(),
                    task.state,
                    task.description
                );
            }
            println!();
        }

        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;

    fn task(id: &str, state: TaskState) -> RemoteTaskHandle {
        RemoteTaskHandle::new(TaskId::new(id).unwrap(), format!("export_{id}")).with_state(state)
    }

    #[test]
    fn test_count_by_state() {
        let tasks = vec![
            task("A", TaskState::Running),
            task("B", TaskState::Ready),
            task("C", TaskState::Running),
            task("D", TaskState::Completed),
        ];
        let counts = count_by_state(&tasks);

        assert_eq!(counts.get("RUNNING"), Some(&2));
        assert_eq!(counts.get("READY"), Some(&1));
        assert_eq!(counts.get("COMPLETED"), Some(&1));
        assert_eq!(counts.get("FAILED"), None);
    }

    #[tokio::test]
    async fn test_status_missing_config() {
        let args = StatusArgs { verbose: false };
        let code = args.execute("/nonexistent/geexport.toml").await.unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
