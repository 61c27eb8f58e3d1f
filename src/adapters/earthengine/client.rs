//! Earth Engine REST client
//!
//! Implements [`FeatureSource`] and [`ExportService`] over the v1 REST API:
//!
//! - features: `POST /v1/projects/{project}/table:computeFeatures`
//! - exports: `POST /v1/projects/{project}/image:export`
//! - task list: `GET /v1/projects/{project}/operations`
//!
//! REST exports are queued as soon as they are created, so
//! [`ExportService::start_task`] has nothing left to do.

use super::expression;
use super::models::{
    ComputeFeaturesRequest, ComputeFeaturesResponse, DriveDestination, ErrorResponse,
    ExportImageRequest, FileExportOptions, ListOperationsResponse, Operation, PixelGrid,
};
use super::traits::{ExportService, ExportTaskRequest, FeatureSource, ImageRef};
use crate::config::{EarthEngineConfig, SourcesConfig};
use crate::domain::{
    DateInterval, Feature, FeatureIndex, GeeError, RemoteError, RemoteTaskHandle, Result,
    SourceKind, TaskId, TaskState,
};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Page size used when listing operations
const OPERATIONS_PAGE_SIZE: &str = "500";

/// HTTP client for the Earth Engine REST API
pub struct EarthEngineClient {
    client: Client,
    config: EarthEngineConfig,
    sources: SourcesConfig,
}

impl EarthEngineClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns [`GeeError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: EarthEngineConfig, sources: SourcesConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GeeError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            sources,
        })
    }

    /// Project-scoped resource URL
    fn project_url(&self, resource: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.project,
            resource
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.config.access_token.expose_secret().as_ref())
    }

    /// Retry a request with exponential backoff
    ///
    /// Only transient failures (connection, timeout, 429, 5xx) are retried.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let retry = &self.config.retry;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    let transient = matches!(&e, GeeError::Remote(r) if r.is_transient());
                    if !transient || attempt >= retry.max_retries {
                        return Err(e);
                    }

                    let delay_ms = (retry.initial_delay_ms as f64
                        * retry.backoff_multiplier.powi(attempt as i32 - 1))
                        as u64;
                    let delay_ms = delay_ms.min(retry.max_delay_ms);

                    crate::log_retry_attempt!(attempt, retry.max_retries, delay_ms, e);

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    /// Send a request and decode a JSON success body
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()).into())
    }
}

fn transport_error(err: reqwest::Error) -> GeeError {
    if err.is_timeout() {
        RemoteError::Timeout(err.to_string()).into()
    } else {
        RemoteError::ConnectionFailed(err.to_string()).into()
    }
}

/// Map non-success statuses to [`RemoteError`]
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RemoteError::AuthenticationFailed(message)
        }
        StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimitExceeded(message),
        s if s.is_server_error() => RemoteError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => RemoteError::ClientError {
            status: s.as_u16(),
            message,
        },
    };
    Err(err.into())
}

/// Map an operation's metadata state onto [`TaskState`]
fn task_state(raw: Option<&str>, done: bool) -> TaskState {
    match raw {
        Some("PENDING") => TaskState::Ready,
        Some("RUNNING") | Some("CANCELLING") => TaskState::Running,
        Some("SUCCEEDED") => TaskState::Completed,
        Some("CANCELLED") => TaskState::Cancelled,
        Some("FAILED") => TaskState::Failed,
        _ if done => TaskState::Completed,
        _ => TaskState::Ready,
    }
}

fn handle_from_operation(operation: Operation) -> Result<RemoteTaskHandle> {
    let id = TaskId::from_operation_name(&operation.name).map_err(RemoteError::InvalidResponse)?;
    let (state, description) = match operation.metadata {
        Some(meta) => (meta.state, meta.description.unwrap_or_default()),
        None => (None, String::new()),
    };
    Ok(RemoteTaskHandle::new(id, description)
        .with_state(task_state(state.as_deref(), operation.done)))
}

#[async_trait]
impl FeatureSource for EarthEngineClient {
    async fn feature(&self, index: FeatureIndex) -> Result<Feature> {
        let body = ComputeFeaturesRequest {
            expression: expression::expression(expression::feature_by_index(
                &self.config.feature_asset_id,
                &self.config.index_property,
                index.value(),
            )),
        };
        let url = self.project_url("table:computeFeatures");

        tracing::debug!(index = %index, "Fetching feature");

        let response: ComputeFeaturesResponse = self
            .retry_request(|| self.send_json(self.client.post(&url).json(&body)))
            .await?;

        let feature = response
            .features
            .into_iter()
            .next()
            .ok_or(GeeError::FeatureNotFound(index.value()))?;

        let geometry = feature.geometry.ok_or_else(|| {
            RemoteError::InvalidResponse(format!("feature {index} has no geometry"))
        })?;

        Ok(Feature::new(index, geometry))
    }
}

#[async_trait]
impl ExportService for EarthEngineClient {
    async fn image_for_interval(
        &self,
        source: SourceKind,
        interval: DateInterval,
    ) -> Result<ImageRef> {
        let collection_id = &self.sources.get(source).collection_id;
        Ok(ImageRef::new(source, collection_id.clone(), interval))
    }

    async fn create_export(&self, request: &ExportTaskRequest) -> Result<RemoteTaskHandle> {
        let image = expression::median_composite(
            &request.image.collection_id,
            &request.image.interval,
        );
        let body = ExportImageRequest {
            expression: expression::expression(expression::clip_and_scale(
                image,
                &request.region,
                request.scale_meters,
            )),
            description: request.description.clone(),
            file_export_options: FileExportOptions {
                file_format: request.file_format.clone(),
                drive_destination: DriveDestination {
                    folder: request.folder.clone(),
                    filename_prefix: request.file_name_prefix.clone(),
                },
            },
            grid: PixelGrid {
                crs_code: request.crs.clone(),
            },
            max_pixels: request.max_pixels.to_string(),
            request_id: uuid::Uuid::new_v4().to_string(),
        };
        let url = self.project_url("image:export");

        let operation: Operation = self
            .retry_request(|| self.send_json(self.client.post(&url).json(&body)))
            .await?;

        let handle = handle_from_operation(operation)?;
        if handle.description.is_empty() {
            return Ok(RemoteTaskHandle {
                description: request.description.clone(),
                ..handle
            });
        }
        Ok(handle)
    }

    async fn start_task(&self, handle: &RemoteTaskHandle) -> Result<()> {
        tracing::trace!(task_id = %handle.id, "Export already queued on creation");
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<RemoteTaskHandle>> {
        let url = self.project_url("operations");
        let mut handles = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page: ListOperationsResponse = self
                .retry_request(|| {
                    let mut request = self
                        .client
                        .get(&url)
                        .query(&[("pageSize", OPERATIONS_PAGE_SIZE)]);
                    if let Some(token) = &page_token {
                        request = request.query(&[("pageToken", token.as_str())]);
                    }
                    self.send_json(request)
                })
                .await?;

            for operation in page.operations {
                handles.push(handle_from_operation(operation)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = handles.len(), "Listed remote tasks");
        Ok(handles)
    }
}
