//! Batch scheduler
//!
//! Submits the (interval x index) job matrix while keeping the account-wide
//! number of active remote tasks under a ceiling. The remote service offers no
//! completion notifications, so capacity is discovered by polling:
//!
//! 1. **Plan** the intervals and `total_planned`.
//! 2. **Submit** jobs in order: intervals chronologically, indices in input
//!    order. Per-job failures are recorded and skipped.
//! 3. **Drain** whenever `submitted_in_current_batch` reaches the ceiling:
//!    poll the active-task count every `check_interval` until it drops below
//!    the ceiling, then reset the batch and carry on.
//! 4. After the last job, drain once more if the current batch is non-empty.
//!
//! The drain sleep and every submission observe the shutdown signal. Once
//! jobs may have gone out, a run-level failure no longer discards the run:
//! it stops submission and is reported on the summary.

use super::submit::SubmissionClient;
use super::summary::{
    ExportError, ExportSummary, JobOutcome, JobResult, RunAbort, RunMetadata,
};
use crate::adapters::earthengine::{ExportService, ImageRef};
use crate::core::partition::partition;
use crate::domain::{
    ExportJob, FeatureIndex, GeeError, RemoteTaskHandle, Result, RunPhase, SourceKind,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use uuid::Uuid;

/// Scheduler knobs
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSettings {
    /// Maximum active remote tasks before submission pauses
    pub ceiling: usize,
    /// Wait between active-task polls
    pub check_interval: Duration,
    /// Resolve and size jobs without submitting
    pub dry_run: bool,
}

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Source kind
    pub source: SourceKind,
    /// Start date, `YYYY-MM-DD`
    pub start: String,
    /// End date, `YYYY-MM-DD`
    pub end: String,
    /// Target feature indices, in submission order
    pub indices: Vec<FeatureIndex>,
    /// Destination folder
    pub folder: String,
}

/// Counters owned by one run
#[derive(Debug, Default, Clone)]
pub struct SchedulerState {
    /// Submissions since the last drain
    pub submitted_in_current_batch: usize,
    /// Submissions over the whole run
    pub total_submitted: usize,
    /// Jobs in the run's matrix
    pub total_planned: usize,
    /// Handles submitted since the last drain
    pub batch: Vec<RemoteTaskHandle>,
    /// Drain cycles entered
    pub batches: usize,
}

impl SchedulerState {
    fn new(total_planned: usize) -> Self {
        Self {
            total_planned,
            ..Default::default()
        }
    }

    fn record_submission(&mut self, handle: RemoteTaskHandle) {
        self.submitted_in_current_batch += 1;
        self.total_submitted += 1;
        self.batch.push(handle);
    }

    fn reset_batch(&mut self) {
        self.submitted_in_current_batch = 0;
        self.batch.clear();
    }
}

/// How a drain ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrainOutcome {
    Cleared,
    Cancelled,
}

/// Export scheduler
pub struct ExportScheduler {
    submitter: SubmissionClient,
    service: Arc<dyn ExportService>,
    settings: SchedulerSettings,
    shutdown: watch::Receiver<bool>,
}

impl ExportScheduler {
    /// Create a new scheduler
    pub fn new(
        submitter: SubmissionClient,
        service: Arc<dyn ExportService>,
        settings: SchedulerSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            submitter,
            service,
            settings,
            shutdown,
        }
    }

    fn is_cancelled(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Execute a run
    ///
    /// # Errors
    ///
    /// - [`GeeError::InvalidDateRange`] if the date range is malformed or empty
    /// - [`GeeError::Validation`] if no indices were given or the ceiling is 0
    /// - [`GeeError::RunAborted`] if the service handshake fails
    ///
    /// Per-job failures are not errors; they are counted in the summary. An
    /// interval whose image can't be resolved stops the run, which then
    /// returns its summary with [`ExportSummary::aborted`] set.
    pub async fn run(&mut self, request: RunRequest) -> Result<ExportSummary> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();

        if self.settings.ceiling == 0 {
            return Err(GeeError::Validation(
                "max_concurrent_tasks must be at least 1".to_string(),
            ));
        }
        if request.indices.is_empty() {
            return Err(GeeError::Validation("no feature indices to export".to_string()));
        }

        let intervals = partition(&request.start, &request.end, request.source)?;
        let mut state = SchedulerState::new(intervals.len() * request.indices.len());

        tracing::info!(
            run_id = %run_id,
            source = %request.source,
            start = %request.start,
            end = %request.end,
            date_ranges = intervals.len(),
            indices = request.indices.len(),
            total_planned = state.total_planned,
            folder = %request.folder,
            ceiling = self.settings.ceiling,
            dry_run = self.settings.dry_run,
            "Starting export run"
        );

        let existing = self
            .service
            .list_tasks()
            .await
            .map_err(|e| GeeError::aborted(RunPhase::Handshake, None, e))?;
        tracing::info!(
            active = existing.iter().filter(|t| t.state.is_active()).count(),
            "Connected to export service"
        );

        let mut outcomes = Vec::with_capacity(state.total_planned);
        let mut interrupted = false;
        let mut aborted = None;

        'intervals: for interval in &intervals {
            if self.is_cancelled() {
                interrupted = true;
                break;
            }

            let image = match self
                .service
                .image_for_interval(request.source, *interval)
                .await
            {
                Ok(image) => image,
                Err(e) => {
                    let abort = RunAbort::new(
                        RunPhase::ImageResolution,
                        Some(format!("interval={interval}")),
                        e,
                    );
                    tracing::error!(
                        interval = %interval,
                        error = %abort.message,
                        submitted = state.total_submitted,
                        planned = state.total_planned,
                        "Failed to resolve image, stopping run"
                    );
                    aborted = Some(abort);
                    break;
                }
            };

            for index in &request.indices {
                if self.is_cancelled() {
                    interrupted = true;
                    break 'intervals;
                }

                if !self.settings.dry_run
                    && state.submitted_in_current_batch >= self.settings.ceiling
                {
                    state.batches += 1;
                    tracing::info!(
                        batch = state.batches,
                        tasks = state.submitted_in_current_batch,
                        "Batch completed, waiting for remote capacity"
                    );
                    if self.drain(&mut state).await == DrainOutcome::Cancelled {
                        interrupted = true;
                        break 'intervals;
                    }
                }

                let job = ExportJob::new(*index, *interval, request.source, request.folder.clone());
                let outcome = self.process_job(&job, &image, &mut state).await;
                outcomes.push(outcome);
            }
        }

        if !interrupted
            && aborted.is_none()
            && !self.settings.dry_run
            && state.submitted_in_current_batch > 0
        {
            state.batches += 1;
            tracing::info!(
                batch = state.batches,
                tasks = state.submitted_in_current_batch,
                "Final batch submitted, waiting for remote capacity"
            );
            if self.drain(&mut state).await == DrainOutcome::Cancelled {
                interrupted = true;
            }
        }

        if interrupted {
            tracing::warn!(
                submitted = state.total_submitted,
                planned = state.total_planned,
                "Export run interrupted by shutdown signal"
            );
        }

        let meta = RunMetadata {
            run_id,
            source: request.source,
            intervals: intervals.len(),
            indices: request.indices.len(),
            batches: state.batches,
            interrupted,
            aborted,
            dry_run: self.settings.dry_run,
            duration: started.elapsed(),
        };
        Ok(ExportSummary::from_outcomes(meta, &outcomes))
    }

    /// Submit (or, in dry run, only prepare) one job and record the outcome
    async fn process_job(
        &self,
        job: &ExportJob,
        image: &ImageRef,
        state: &mut SchedulerState,
    ) -> JobOutcome {
        let context = format!("index={} interval={}", job.index(), job.interval());

        let result = if self.settings.dry_run {
            self.submitter
                .prepare(job, image)
                .await
                .map(|prepared| {
                    tracing::info!(
                        index = %job.index(),
                        interval = %job.interval(),
                        file_name_prefix = %prepared.request.file_name_prefix,
                        "Dry run: export not submitted"
                    );
                    JobResult::Skipped("dry run".to_string())
                })
        } else {
            self.submitter.submit(job, image).await.map(|handle| {
                state.record_submission(handle.clone());
                tracing::info!(
                    total = state.total_planned,
                    current = state.total_submitted,
                    index = %job.index(),
                    interval = %job.interval(),
                    source = %job.source(),
                    folder = %job.folder(),
                    task_id = %handle.id,
                    "Task submitted"
                );
                JobResult::Submitted(handle)
            })
        };

        let result = result.unwrap_or_else(|e| {
            tracing::error!(
                index = %job.index(),
                interval = %job.interval(),
                error = %e,
                "Failed to submit export, skipping"
            );
            JobResult::Failed(ExportError::from(&e).with_context(context))
        });

        JobOutcome::new(job.index(), job.interval(), result)
    }

    /// Poll until the active-task count drops below the ceiling
    ///
    /// Poll failures count as "still at capacity".
    async fn drain(&mut self, state: &mut SchedulerState) -> DrainOutcome {
        let ceiling = self.settings.ceiling;
        let interval = self.settings.check_interval;

        loop {
            if self.is_cancelled() {
                return DrainOutcome::Cancelled;
            }

            match self.service.active_task_count().await {
                Ok(active) if active < ceiling => {
                    tracing::info!(
                        active = active,
                        ceiling = ceiling,
                        available = ceiling - active,
                        "Remote task list has capacity for new submissions"
                    );
                    state.reset_batch();
                    return DrainOutcome::Cleared;
                }
                Ok(active) => {
                    tracing::info!(
                        active = active,
                        ceiling = ceiling,
                        wait_secs = interval.as_secs(),
                        "At capacity, waiting before checking task status again"
                    );
                }
                Err(e) => {
                    let err = GeeError::RemoteStatus(e.to_string());
                    tracing::warn!(
                        error = %err,
                        wait_secs = interval.as_secs(),
                        "Treating task status as at capacity"
                    );
                }
            }

            if self.wait_or_cancel(interval).await {
                return DrainOutcome::Cancelled;
            }
        }
    }

    /// Sleep for `duration`; returns true if shutdown was signalled first
    async fn wait_or_cancel(&mut self, duration: Duration) -> bool {
        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                changed = self.shutdown.changed() => match changed {
                    Ok(()) if *self.shutdown.borrow() => return true,
                    Ok(()) => continue,
                    Err(_) => {
                        // Sender gone; no signal can arrive any more
                        (&mut sleep).await;
                        return false;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::earthengine::{ExportTaskRequest, FeatureSource};
    use crate::core::export::submit::ExportParameters;
    use crate::domain::{Bounds, DateInterval, Feature, Position, TaskId, TaskState};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Features;

    #[async_trait]
    impl FeatureSource for Features {
        async fn feature(&self, index: FeatureIndex) -> Result<Feature> {
            let geometry = Bounds::around(Position::new(10.0, 45.0), 50.0).to_polygon();
            Ok(Feature::new(index, geometry))
        }
    }

    #[derive(Default)]
    struct Backend {
        polls: Mutex<VecDeque<Result<usize>>>,
        created: Mutex<Vec<String>>,
        fail_create: Vec<String>,
        fail_handshake: bool,
        fail_image_from: Option<usize>,
        image_calls: Mutex<usize>,
    }

    #[async_trait]
    impl ExportService for Backend {
        async fn image_for_interval(
            &self,
            source: SourceKind,
            interval: DateInterval,
        ) -> Result<ImageRef> {
            let mut calls = self.image_calls.lock().unwrap();
            *calls += 1;
            if self.fail_image_from.is_some_and(|n| *calls >= n) {
                return Err(GeeError::Other("collection missing".to_string()));
            }
            Ok(ImageRef::new(source, "collection", interval))
        }

        async fn create_export(&self, request: &ExportTaskRequest) -> Result<RemoteTaskHandle> {
            if self.fail_create.contains(&request.description) {
                return Err(GeeError::Other("quota".to_string()));
            }
            let mut created = self.created.lock().unwrap();
            created.push(request.description.clone());
            let id = TaskId::new(format!("T{}", created.len())).unwrap();
            Ok(RemoteTaskHandle::new(id, request.description.clone()))
        }

        async fn start_task(&self, _handle: &RemoteTaskHandle) -> Result<()> {
            Ok(())
        }

        async fn list_tasks(&self) -> Result<Vec<RemoteTaskHandle>> {
            if self.fail_handshake {
                return Err(GeeError::Other("unreachable".to_string()));
            }
            Ok(vec![RemoteTaskHandle::new(TaskId::new("OLD").unwrap(), "old")
                .with_state(TaskState::Completed)])
        }

        async fn active_task_count(&self) -> Result<usize> {
            self.polls.lock().unwrap().pop_front().unwrap_or(Ok(0))
        }
    }

    fn build(
        backend: Arc<Backend>,
        ceiling: usize,
        dry_run: bool,
    ) -> (ExportScheduler, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let parameters = ExportParameters {
            scale_meters: 5,
            crs: "EPSG:4326".to_string(),
            max_pixels: 1_000,
            file_format: "GEO_TIFF".to_string(),
        };
        let submitter = SubmissionClient::new(Arc::new(Features), backend.clone(), parameters);
        let settings = SchedulerSettings {
            ceiling,
            check_interval: Duration::from_secs(600),
            dry_run,
        };
        (ExportScheduler::new(submitter, backend, settings, rx), tx)
    }

    fn request(indices: &[i64]) -> RunRequest {
        RunRequest {
            source: SourceKind::Nicfi,
            start: "2024-01-01".to_string(),
            end: "2024-03-01".to_string(),
            indices: indices.iter().copied().map(FeatureIndex::new).collect(),
            folder: "exports".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_submits_in_interval_then_index_order() {
        let backend = Arc::new(Backend::default());
        let (mut scheduler, _tx) = build(backend.clone(), 100, false);

        let summary = scheduler.run(request(&[3, 1])).await.unwrap();

        assert_eq!(summary.planned, 4);
        assert_eq!(summary.submitted, 4);
        assert!(summary.is_complete());
        assert_eq!(summary.batches, 1);
        assert_eq!(
            *backend.created.lock().unwrap(),
            vec![
                "export_3_2024-01",
                "export_1_2024-01",
                "export_3_2024-02",
                "export_1_2024-02"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_failure_is_isolated() {
        let backend = Arc::new(Backend {
            fail_create: vec!["export_1_2024-01".to_string()],
            ..Default::default()
        });
        let (mut scheduler, _tx) = build(backend.clone(), 100, false);

        let summary = scheduler.run(request(&[1, 2])).await.unwrap();

        assert_eq!(summary.planned, 4);
        assert_eq!(summary.submitted, 3);
        assert_eq!(summary.failed, 1);
        assert!(summary.submitted < summary.planned);
        assert_eq!(
            summary.errors[0].context.as_deref(),
            Some("index=1 interval=2024-01-01..2024-02-01")
        );
        assert_eq!(backend.created.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_range_aborts_before_contacting_service() {
        let backend = Arc::new(Backend {
            fail_handshake: true,
            ..Default::default()
        });
        let (mut scheduler, _tx) = build(backend, 2, false);

        let mut bad = request(&[1]);
        bad.end = "2023-12-01".to_string();
        assert!(matches!(
            scheduler.run(bad).await,
            Err(GeeError::InvalidDateRange(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handshake_failure_aborts_run() {
        let backend = Arc::new(Backend {
            fail_handshake: true,
            ..Default::default()
        });
        let (mut scheduler, _tx) = build(backend.clone(), 2, false);

        let err = scheduler.run(request(&[1])).await.unwrap_err();
        assert!(matches!(
            err,
            GeeError::RunAborted {
                phase: RunPhase::Handshake,
                ..
            }
        ));
        assert!(backend.created.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_image_failure_aborts_with_interval_context() {
        let backend = Arc::new(Backend {
            fail_image_from: Some(1),
            ..Default::default()
        });
        let (mut scheduler, _tx) = build(backend, 2, false);

        let summary = scheduler.run(request(&[1])).await.unwrap();
        let abort = summary.aborted.as_ref().expect("run should be aborted");
        assert_eq!(abort.phase, RunPhase::ImageResolution);
        assert!(abort.context.as_deref().unwrap().contains("2024-01-01"));
        assert_eq!(summary.submitted, 0);
        assert_eq!(summary.not_attempted(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_image_failure_after_submissions_keeps_counts() {
        let backend = Arc::new(Backend {
            fail_image_from: Some(2),
            ..Default::default()
        });
        let (mut scheduler, _tx) = build(backend.clone(), 100, false);

        let summary = scheduler.run(request(&[1, 2])).await.unwrap();

        assert_eq!(summary.planned, 4);
        assert_eq!(summary.submitted, 2);
        assert_eq!(summary.not_attempted(), 2);
        assert!(!summary.is_complete());
        assert_eq!(summary.batches, 0);
        assert_eq!(
            summary.aborted.as_ref().and_then(|a| a.context.as_deref()),
            Some("interval=2024-02-01..2024-03-01")
        );
        assert_eq!(backend.created.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_errors_count_as_at_capacity() {
        let backend = Arc::new(Backend::default());
        backend.polls.lock().unwrap().extend([
            Err(GeeError::Other("timeout".to_string())),
            Ok(0),
        ]);
        let (mut scheduler, _tx) = build(backend.clone(), 1, false);

        let started = tokio::time::Instant::now();
        let mut single = request(&[1]);
        single.end = "2024-02-01".to_string();
        let summary = scheduler.run(single).await.unwrap();

        assert_eq!(summary.submitted, 1);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(600));
        assert!(waited < Duration::from_secs(601));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dry_run_submits_nothing() {
        let backend = Arc::new(Backend::default());
        let (mut scheduler, _tx) = build(backend.clone(), 1, true);

        let summary = scheduler.run(request(&[1, 2, 3])).await.unwrap();

        assert!(summary.dry_run);
        assert_eq!(summary.planned, 6);
        assert_eq!(summary.skipped, 6);
        assert_eq!(summary.submitted, 0);
        assert_eq!(summary.batches, 0);
        assert!(backend.created.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_drain_interrupts() {
        let backend = Arc::new(Backend::default());
        backend
            .polls
            .lock()
            .unwrap()
            .extend([Ok(5), Ok(5), Ok(5), Ok(5)]);
        let (mut scheduler, tx) = build(backend.clone(), 1, false);

        let handle = tokio::spawn(async move { scheduler.run(request(&[1, 2])).await });
        tokio::time::sleep(Duration::from_secs(900)).await;
        tx.send(true).unwrap();

        let summary = handle.await.unwrap().unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.submitted, 1);
        assert_eq!(summary.not_attempted(), 3);
        assert_eq!(backend.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_inputs_are_rejected() {
        let backend = Arc::new(Backend::default());
        let (mut scheduler, _tx) = build(backend.clone(), 1, false);
        assert!(matches!(
            scheduler.run(request(&[])).await,
            Err(GeeError::Validation(_))
        ));

        let (mut scheduler, _tx) = build(backend, 0, false);
        assert!(matches!(
            scheduler.run(request(&[1])).await,
            Err(GeeError::Validation(_))
        ));
    }

    #[test]
    fn test_state_reset_keeps_totals() {
        let mut state = SchedulerState::new(10);
        state.record_submission(RemoteTaskHandle::new(TaskId::new("A").unwrap(), "a"));
        state.record_submission(RemoteTaskHandle::new(TaskId::new("B").unwrap(), "b"));
        assert_eq!(state.submitted_in_current_batch, 2);
        assert_eq!(state.batch.len(), 2);

        state.reset_batch();
        assert_eq!(state.submitted_in_current_batch, 0);
        assert!(state.batch.is_empty());
        assert_eq!(state.total_submitted, 2);
        assert_eq!(state.total_planned, 10);
    }
}
