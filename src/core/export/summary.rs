//! Export summary and reporting
//!
//! A run records one [`JobOutcome`] per attempted job; the summary is derived
//! from those outcomes plus a few run-level facts. A run that stops early,
//! by signal or by a run-level failure after jobs went out, still reports
//! what it submitted.

use crate::domain::{DateInterval, FeatureIndex, GeeError, RemoteTaskHandle, RunPhase, SourceKind};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Result of one job
#[derive(Debug, Clone)]
pub enum JobResult {
    /// Created and started remotely
    Submitted(RemoteTaskHandle),
    /// Planned and sized but deliberately not submitted
    Skipped(String),
    /// Failed; the run carried on
    Failed(ExportError),
}

/// Outcome of one (interval, index) job
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// Feature index
    pub index: FeatureIndex,
    /// Date interval
    pub interval: DateInterval,
    /// What happened
    pub result: JobResult,
}

impl JobOutcome {
    /// Create a new outcome
    pub fn new(index: FeatureIndex, interval: DateInterval, result: JobResult) -> Self {
        Self {
            index,
            interval,
            result,
        }
    }
}

/// Run-level failure that stopped a run part-way through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunAbort {
    /// Phase in which the run failed
    pub phase: RunPhase,
    /// Interval context, when known
    pub context: Option<String>,
    /// Underlying error message
    pub message: String,
}

impl RunAbort {
    /// Create a new abort record
    pub fn new(phase: RunPhase, context: Option<String>, err: impl fmt::Display) -> Self {
        Self {
            phase,
            context,
            message: err.to_string(),
        }
    }

    /// The equivalent run-level error
    pub fn to_error(&self) -> GeeError {
        GeeError::aborted(self.phase, self.context.clone(), &self.message)
    }
}

impl fmt::Display for RunAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aborted during {}: {}", self.phase, self.message)?;
        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }
        Ok(())
    }
}

/// Run-level facts that don't come from individual outcomes
#[derive(Debug, Clone)]
pub struct RunMetadata {
    /// Run identifier
    pub run_id: Uuid,
    /// Source kind
    pub source: SourceKind,
    /// Number of date intervals
    pub intervals: usize,
    /// Number of feature indices
    pub indices: usize,
    /// Number of drain cycles, including the final one
    pub batches: usize,
    /// Stopped by a shutdown signal
    pub interrupted: bool,
    /// Stopped by a run-level failure
    pub aborted: Option<RunAbort>,
    /// Nothing was submitted on purpose
    pub dry_run: bool,
    /// Wall-clock duration
    pub duration: Duration,
}

/// Summary of an export run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Run identifier
    pub run_id: Uuid,

    /// Source kind
    pub source: SourceKind,

    /// Number of date intervals
    pub intervals: usize,

    /// Number of feature indices
    pub indices: usize,

    /// Jobs planned (intervals x indices)
    pub planned: usize,

    /// Jobs submitted
    pub submitted: usize,

    /// Jobs that failed
    pub failed: usize,

    /// Jobs skipped (dry run)
    pub skipped: usize,

    /// Drain cycles
    pub batches: usize,

    /// Stopped by a shutdown signal
    pub interrupted: bool,

    /// Stopped by a run-level failure
    pub aborted: Option<RunAbort>,

    /// Dry run
    pub dry_run: bool,

    /// Duration of the run
    pub duration: Duration,

    /// Errors encountered during the run
    pub errors: Vec<ExportError>,
}

impl ExportSummary {
    /// Build the summary from a run's outcomes
    pub fn from_outcomes(meta: RunMetadata, outcomes: &[JobOutcome]) -> Self {
        let mut submitted = 0;
        let mut skipped = 0;
        let mut errors = Vec::new();

        for outcome in outcomes {
            match &outcome.result {
                JobResult::Submitted(_) => submitted += 1,
                JobResult::Skipped(_) => skipped += 1,
                JobResult::Failed(error) => errors.push(error.clone()),
            }
        }

        Self {
            run_id: meta.run_id,
            source: meta.source,
            intervals: meta.intervals,
            indices: meta.indices,
            planned: meta.intervals * meta.indices,
            submitted,
            failed: errors.len(),
            skipped,
            batches: meta.batches,
            interrupted: meta.interrupted,
            aborted: meta.aborted,
            dry_run: meta.dry_run,
            duration: meta.duration,
            errors,
        }
    }

    /// Every planned job was submitted
    pub fn is_complete(&self) -> bool {
        self.submitted == self.planned
    }

    /// Jobs neither submitted, failed nor skipped (cut off by an interruption
    /// or an abort)
    pub fn not_attempted(&self) -> usize {
        self.planned
            .saturating_sub(self.submitted + self.failed + self.skipped)
    }

    /// Submitted jobs as a percentage of planned
    pub fn success_rate(&self) -> f64 {
        if self.planned == 0 {
            return 100.0;
        }
        (self.submitted as f64 / self.planned as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            source = %self.source,
            batches = self.batches,
            date_ranges = self.intervals,
            indices = self.indices,
            planned = self.planned,
            submitted = self.submitted,
            failed = self.failed,
            skipped = self.skipped,
            interrupted = self.interrupted,
            aborted = self.aborted.is_some(),
            dry_run = self.dry_run,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export run completed"
        );

        if let Some(abort) = &self.aborted {
            tracing::error!(
                phase = %abort.phase,
                context = abort.context.as_deref().unwrap_or(""),
                error = %abort.message,
                not_attempted = self.not_attempted(),
                "Export run aborted"
            );
        }

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Export run completed with errors");
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = error.context.as_deref().unwrap_or(""),
                    "Export error"
                );
            }
        }
    }
}

/// Type of export error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportErrorType {
    /// The feature index is not in the collection
    FeatureNotFound,
    /// Feature lookup, create or start failed
    Submission,
}

/// Export error with context
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g. index and interval)
    pub context: Option<String>,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}

impl From<&GeeError> for ExportError {
    fn from(err: &GeeError) -> Self {
        let error_type = match err {
            GeeError::FeatureNotFound(_) => ExportErrorType::FeatureNotFound,
            _ => ExportErrorType::Submission,
        };
        Self::new(error_type, err.to_string())
    }
}
