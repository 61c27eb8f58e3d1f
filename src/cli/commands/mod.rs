//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod export;
pub mod init;
pub mod plan;
pub mod status;
pub mod validate;

use crate::config::{load_target_file, parse_index_list};
use crate::domain::{FeatureIndex, GeeError, Result, RunPhase, SourceKind};
use clap::{ArgGroup, Args};

/// Exit code: every job submitted
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code: run finished but some jobs failed
pub const EXIT_PARTIAL: i32 = 1;
/// Exit code: configuration or input error
pub const EXIT_CONFIG: i32 = 2;
/// Exit code: the remote service could not be reached
pub const EXIT_CONNECTION: i32 = 4;
/// Exit code: run aborted
pub const EXIT_FATAL: i32 = 5;
/// Exit code: interrupted by a signal
pub const EXIT_INTERRUPTED: i32 = 130;

/// Run inputs shared by `export` and `plan`
#[derive(Args, Debug, Clone)]
#[command(group(
    ArgGroup::new("targets")
        .required(true)
        .args(["indices", "target_file"]),
))]
pub struct RunArgs {
    /// Imagery source (nicfi or sentinel)
    #[arg(long)]
    pub source: SourceKind,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// Day after the last day of the range (YYYY-MM-DD)
    #[arg(long)]
    pub end: String,

    /// Feature indices to export (comma-separated)
    #[arg(long)]
    pub indices: Option<String>,

    /// CSV file whose first column lists feature indices (header row skipped)
    #[arg(long, value_name = "PATH")]
    pub target_file: Option<String>,
}

impl RunArgs {
    /// Resolve the target indices from `--indices` or `--target-file`
    pub fn resolve_indices(&self) -> Result<Vec<FeatureIndex>> {
        match (&self.indices, &self.target_file) {
            (Some(list), _) => parse_index_list(list),
            (None, Some(path)) => load_target_file(path),
            (None, None) => Err(GeeError::Validation(
                "one of --indices or --target-file is required".to_string(),
            )),
        }
    }
}

/// Map a run-level error to a process exit code
pub fn exit_code_for(err: &GeeError) -> i32 {
    match err {
        GeeError::Configuration(_)
        | GeeError::InvalidDateRange(_)
        | GeeError::Validation(_)
        | GeeError::Io(_) => EXIT_CONFIG,
        GeeError::RunAborted {
            phase: RunPhase::Handshake,
            ..
        }
        | GeeError::Remote(_)
        | GeeError::RemoteStatus(_) => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(indices: Option<&str>, target_file: Option<String>) -> RunArgs {
        RunArgs {
            source: SourceKind::Sentinel,
            start: "2024-01-01".to_string(),
            end: "2024-02-01".to_string(),
            indices: indices.map(str::to_string),
            target_file,
        }
    }

    #[test]
    fn test_resolve_indices_from_list() {
        let indices = args(Some("4, 2,9"), None).resolve_indices().unwrap();
        let values: Vec<i64> = indices.iter().map(|i| i.value()).collect();
        assert_eq!(values, vec![4, 2, 9]);
    }

    #[test]
    fn test_resolve_indices_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Index,Name").unwrap();
        writeln!(file, "17,north").unwrap();
        writeln!(file, "3,south").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let indices = args(None, Some(path)).resolve_indices().unwrap();
        let values: Vec<i64> = indices.iter().map(|i| i.value()).collect();
        assert_eq!(values, vec![17, 3]);
    }

    #[test]
    fn test_resolve_indices_requires_input() {
        assert!(matches!(
            args(None, None).resolve_indices(),
            Err(GeeError::Validation(_))
        ));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code_for(&GeeError::InvalidDateRange("empty".to_string())),
            EXIT_CONFIG
        );
        assert_eq!(
            exit_code_for(&GeeError::aborted(RunPhase::Handshake, None, "refused")),
            EXIT_CONNECTION
        );
        assert_eq!(
            exit_code_for(&GeeError::aborted(
                RunPhase::ImageResolution,
                Some("interval=2024-01-01..2024-02-01".to_string()),
                "missing collection"
            )),
            EXIT_FATAL
        );
    }
}
