//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for geexport using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// geexport - batch export scheduler for per-feature clipped imagery
#[derive(Parser, Debug)]
#[command(name = "geexport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "geexport.toml", env = "GEEXPORT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GEEXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit export tasks for every (interval, feature) pair
    Export(commands::export::ExportArgs),

    /// Show the date intervals and job count of a run without contacting the service
    Plan(commands::plan::PlanArgs),

    /// Show the number of active remote tasks against the ceiling
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceKind;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from([
            "geexport",
            "export",
            "--source",
            "nicfi",
            "--start",
            "2024-01-01",
            "--end",
            "2024-03-01",
            "--indices",
            "1,2,3",
        ]);
        assert_eq!(cli.config, "geexport.toml");
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.run.source, SourceKind::Nicfi);
                assert_eq!(args.run.indices.as_deref(), Some("1,2,3"));
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["geexport", "--config", "custom.toml", "status"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["geexport", "--log-level", "debug", "validate-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_rejects_unknown_source() {
        let result = Cli::try_parse_from([
            "geexport",
            "plan",
            "--source",
            "landsat",
            "--start",
            "2024-01-01",
            "--end",
            "2024-02-01",
            "--indices",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_exactly_one_target_input() {
        let both = Cli::try_parse_from([
            "geexport",
            "plan",
            "--source",
            "nicfi",
            "--start",
            "2024-01-01",
            "--end",
            "2024-02-01",
            "--indices",
            "1",
            "--target-file",
            "targets.csv",
        ]);
        assert!(both.is_err());

        let neither = Cli::try_parse_from([
            "geexport",
            "plan",
            "--source",
            "nicfi",
            "--start",
            "2024-01-01",
            "--end",
            "2024-02-01",
        ]);
        assert!(neither.is_err());
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["geexport", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
