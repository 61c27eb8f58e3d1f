//! Export scheduling and submission
//!
//! This module provides the core export logic for geexport, including:
//! - Single-job submission (feature lookup, sizing, create and start)
//! - The batch scheduler that keeps remote tasks under the ceiling
//! - Summary and reporting

pub mod scheduler;
pub mod submit;
pub mod summary;

pub use scheduler::{ExportScheduler, RunRequest, SchedulerSettings, SchedulerState};
pub use submit::{ExportParameters, PreparedExport, SubmissionClient};
pub use summary::{
    ExportError, ExportErrorType, ExportSummary, JobOutcome, JobResult, RunAbort,
};
