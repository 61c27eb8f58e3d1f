//! Export jobs and remote task handles

use crate::domain::geometry::Bounds;
use crate::domain::ids::{FeatureIndex, TaskId};
use crate::domain::interval::DateInterval;
use crate::domain::source::SourceKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One (date interval, feature index) cell of a run's job matrix
///
/// Immutable once constructed. The scheduler drops it as soon as the
/// submission outcome is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportJob {
    index: FeatureIndex,
    interval: DateInterval,
    source: SourceKind,
    folder: String,
}

impl ExportJob {
    /// Create a new export job
    pub fn new(
        index: FeatureIndex,
        interval: DateInterval,
        source: SourceKind,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            index,
            interval,
            source,
            folder: folder.into(),
        }
    }

    /// Feature index
    pub fn index(&self) -> FeatureIndex {
        self.index
    }

    /// Date interval
    pub fn interval(&self) -> DateInterval {
        self.interval
    }

    /// Source kind
    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// Destination folder
    pub fn folder(&self) -> &str {
        &self.folder
    }
}

/// Sizing tier that produced an export region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
    /// Under 1 ha: fixed 4 ha square
    Tiny,
    /// 1 to 4 ha: fixed 10 ha square
    Small,
    /// 4 to 10 ha: square of five times the feature area
    Medium,
    /// 10 ha and up: the feature's own bounds
    Large,
}

/// Area a job exports, derived from a feature's geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportRegion {
    /// Rectangle sent to the export API
    pub bounds: Bounds,
    /// True area of the source feature in hectares
    pub source_area_ha: f64,
    /// Tier the feature fell into
    pub tier: SizeTier,
}

/// Last observed state of a remote task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// Queued but not yet running
    Ready,
    /// Running
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
    /// Cancelled
    Cancelled,
}

impl TaskState {
    /// Whether the task still counts against the account's concurrency ceiling
    pub fn is_active(&self) -> bool {
        matches!(self, TaskState::Ready | TaskState::Running)
    }

    /// Uppercase name as reported by the service
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Ready => "READY",
            TaskState::Running => "RUNNING",
            TaskState::Completed => "COMPLETED",
            TaskState::Failed => "FAILED",
            TaskState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a submitted remote export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTaskHandle {
    /// Remote task identifier
    pub id: TaskId,
    /// Last observed state
    pub state: TaskState,
    /// Task description given at submission
    pub description: String,
}

impl RemoteTaskHandle {
    /// Create a handle for a freshly created task
    pub fn new(id: TaskId, description: impl Into<String>) -> Self {
        Self {
            id,
            state: TaskState::Ready,
            description: description.into(),
        }
    }

    /// Set the observed state
    pub fn with_state(mut self, state: TaskState) -> Self {
        self.state = state;
        self
    }
}
