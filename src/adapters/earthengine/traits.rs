//! Remote service contracts
//!
//! The scheduler only talks to the processing service through these two
//! traits, so runs can be driven against an in-memory backend in tests.

use crate::domain::{
    Bounds, DateInterval, Feature, FeatureIndex, RemoteTaskHandle, Result, SourceKind,
};
use async_trait::async_trait;

/// Opaque handle to the composite image for one date interval
///
/// Resolved once per interval and shared by every job in it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    /// Source the image comes from
    pub source: SourceKind,
    /// Image collection id
    pub collection_id: String,
    /// Date window of the composite
    pub interval: DateInterval,
}

impl ImageRef {
    /// Create a new image reference
    pub fn new(source: SourceKind, collection_id: impl Into<String>, interval: DateInterval) -> Self {
        Self {
            source,
            collection_id: collection_id.into(),
            interval,
        }
    }
}

/// Everything needed to create one remote export task
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTaskRequest {
    /// Image to export
    pub image: ImageRef,
    /// Feature the export is for
    pub index: FeatureIndex,
    /// Export rectangle
    pub region: Bounds,
    /// Pixel size in meters
    pub scale_meters: u32,
    /// Output CRS, e.g. `EPSG:4326`
    pub crs: String,
    /// Pixel-count ceiling
    pub max_pixels: u64,
    /// Destination folder
    pub folder: String,
    /// Output file name prefix
    pub file_name_prefix: String,
    /// Task description
    pub description: String,
    /// Output file format
    pub file_format: String,
}

/// Read access to the shared feature collection
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Fetch the feature whose index property equals `index`
    ///
    /// # Errors
    ///
    /// [`GeeError::FeatureNotFound`](crate::domain::GeeError::FeatureNotFound)
    /// if no feature carries the index.
    async fn feature(&self, index: FeatureIndex) -> Result<Feature>;
}

/// Remote batch export API
#[async_trait]
pub trait ExportService: Send + Sync {
    /// Resolve the composite image for a source and interval
    async fn image_for_interval(
        &self,
        source: SourceKind,
        interval: DateInterval,
    ) -> Result<ImageRef>;

    /// Create an export task
    async fn create_export(&self, request: &ExportTaskRequest) -> Result<RemoteTaskHandle>;

    /// Start a created task
    async fn start_task(&self, handle: &RemoteTaskHandle) -> Result<()>;

    /// Every task visible to the account, not only this run's
    async fn list_tasks(&self) -> Result<Vec<RemoteTaskHandle>>;

    /// Number of account-wide tasks in READY or RUNNING
    async fn active_task_count(&self) -> Result<usize> {
        let tasks = self.list_tasks().await?;
        Ok(tasks.iter().filter(|t| t.state.is_active()).count())
    }
}
