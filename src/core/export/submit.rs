//! Job submission
//!
//! Turns one [`ExportJob`] into a remote export task: resolve the feature,
//! size its export region, build the request, then create and start the
//! task. Failures are per job and never touch sibling jobs.

use crate::adapters::earthengine::{ExportService, ExportTaskRequest, FeatureSource, ImageRef};
use crate::config::GeeConfig;
use crate::core::region::{date_label, size_region};
use crate::domain::{
    ExportJob, FeatureIndex, GeeError, RemoteTaskHandle, Result, SizeTier, SourceKind,
};
use std::sync::Arc;

/// Export parameters shared by every job of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ExportParameters {
    /// Pixel size in meters
    pub scale_meters: u32,
    /// Output CRS
    pub crs: String,
    /// Pixel-count ceiling
    pub max_pixels: u64,
    /// Output file format
    pub file_format: String,
}

impl ExportParameters {
    /// Parameters for `source` from configuration
    pub fn from_config(config: &GeeConfig, source: SourceKind) -> Self {
        Self {
            scale_meters: config.sources.get(source).scale_meters,
            crs: config.export.crs.clone(),
            max_pixels: config.export.max_pixels,
            file_format: config.export.file_format.clone(),
        }
    }
}

/// `{index}-{label}-{source}`
pub fn file_name_prefix(index: FeatureIndex, label: &str, source: SourceKind) -> String {
    format!("{index}-{label}-{source}")
}

/// `export_{index}_{label}`
pub fn task_description(index: FeatureIndex, label: &str) -> String {
    format!("export_{index}_{label}")
}

/// A fully built request, plus sizing diagnostics
#[derive(Debug, Clone)]
pub struct PreparedExport {
    /// Request ready to send
    pub request: ExportTaskRequest,
    /// True feature area in hectares
    pub area_ha: f64,
    /// Sizing tier
    pub tier: SizeTier,
}

/// Submits single jobs to the remote service
pub struct SubmissionClient {
    features: Arc<dyn FeatureSource>,
    service: Arc<dyn ExportService>,
    parameters: ExportParameters,
}

impl SubmissionClient {
    /// Create a new submission client
    pub fn new(
        features: Arc<dyn FeatureSource>,
        service: Arc<dyn ExportService>,
        parameters: ExportParameters,
    ) -> Self {
        Self {
            features,
            service,
            parameters,
        }
    }

    /// Resolve the job's feature and build its export request
    ///
    /// # Errors
    ///
    /// [`GeeError::FeatureNotFound`] if the index is absent, otherwise
    /// [`GeeError::Submission`].
    pub async fn prepare(&self, job: &ExportJob, image: &ImageRef) -> Result<PreparedExport> {
        let feature = self.features.feature(job.index()).await.map_err(|e| match e {
            GeeError::FeatureNotFound(_) => e,
            other => GeeError::Submission(format!(
                "failed to fetch feature {}: {other}",
                job.index()
            )),
        })?;

        let (region, area_ha) = size_region(&feature.geometry);
        let label = date_label(&job.interval(), job.source());

        let request = ExportTaskRequest {
            image: image.clone(),
            index: job.index(),
            region: region.bounds,
            scale_meters: self.parameters.scale_meters,
            crs: self.parameters.crs.clone(),
            max_pixels: self.parameters.max_pixels,
            folder: job.folder().to_string(),
            file_name_prefix: file_name_prefix(job.index(), &label, job.source()),
            description: task_description(job.index(), &label),
            file_format: self.parameters.file_format.clone(),
        };

        tracing::debug!(
            index = %job.index(),
            shape_size_ha = format!("{area_ha:.2}"),
            export_size_ha = format!("{:.2}", region.bounds.area_hectares()),
            tier = ?region.tier,
            scale = request.scale_meters,
            max_pixels = request.max_pixels,
            crs = %request.crs,
            date_label = %label,
            "Export settings"
        );

        Ok(PreparedExport {
            request,
            area_ha,
            tier: region.tier,
        })
    }

    /// Prepare, create and start one job
    pub async fn submit(&self, job: &ExportJob, image: &ImageRef) -> Result<RemoteTaskHandle> {
        let prepared = self.prepare(job, image).await?;
        self.submit_prepared(&prepared.request).await
    }

    /// Create and start a prepared request; both must succeed
    pub async fn submit_prepared(&self, request: &ExportTaskRequest) -> Result<RemoteTaskHandle> {
        let handle = self.service.create_export(request).await.map_err(|e| {
            GeeError::Submission(format!("failed to create {}: {e}", request.description))
        })?;

        self.service.start_task(&handle).await.map_err(|e| {
            GeeError::Submission(format!("failed to start {} ({}): {e}", request.description, handle.id))
        })?;

        Ok(handle)
    }
}
