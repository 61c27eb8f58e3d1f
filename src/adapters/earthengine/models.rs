//! Earth Engine REST wire models
//!
//! Only the fields geexport reads or writes are modelled; everything else in
//! the service's responses is ignored.

use crate::domain::Geometry;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /v1/projects/{project}/image:export`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportImageRequest {
    /// Serialized expression graph of the image to export
    pub expression: Value,
    /// Task description shown in the task list
    pub description: String,
    /// Output file options
    pub file_export_options: FileExportOptions,
    /// Output pixel grid
    pub grid: PixelGrid,
    /// Pixel-count ceiling, int64 encoded as a string
    pub max_pixels: String,
    /// Idempotency key so retried requests don't create duplicate tasks
    pub request_id: String,
}

/// File export options
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileExportOptions {
    /// e.g. `GEO_TIFF`
    pub file_format: String,
    /// Drive destination
    pub drive_destination: DriveDestination,
}

/// Drive destination
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveDestination {
    /// Folder name
    pub folder: String,
    /// File name prefix
    pub filename_prefix: String,
}

/// Output pixel grid
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelGrid {
    /// e.g. `EPSG:4326`
    pub crs_code: String,
}

/// Body of `POST /v1/projects/{project}/table:computeFeatures`
#[derive(Debug, Clone, Serialize)]
pub struct ComputeFeaturesRequest {
    /// Serialized expression graph of the feature collection
    pub expression: Value,
}

/// Response of `table:computeFeatures`
#[derive(Debug, Clone, Deserialize)]
pub struct ComputeFeaturesResponse {
    #[serde(default)]
    pub features: Vec<WireFeature>,
}

/// A GeoJSON feature returned by the service
#[derive(Debug, Clone, Deserialize)]
pub struct WireFeature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// Long-running operation wrapping an export task
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    /// `projects/{project}/operations/{id}`
    pub name: String,
    #[serde(default)]
    pub metadata: Option<OperationMetadata>,
    #[serde(default)]
    pub done: bool,
}

/// Operation metadata
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    /// PENDING, RUNNING, CANCELLING, SUCCEEDED, CANCELLED or FAILED
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response of `GET /v1/projects/{project}/operations`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOperationsResponse {
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Error body returned by Google APIs
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorStatus,
}

/// Error status
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorStatus {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_export_request_serializes_camel_case() {
        let request = ExportImageRequest {
            expression: json!({"result": "0", "values": {}}),
            description: "export_12_2024-01".to_string(),
            file_export_options: FileExportOptions {
                file_format: "GEO_TIFF".to_string(),
                drive_destination: DriveDestination {
                    folder: "exports".to_string(),
                    filename_prefix: "12-2024-01-nicfi".to_string(),
                },
            },
            grid: PixelGrid {
                crs_code: "EPSG:4326".to_string(),
            },
            max_pixels: "10000000000000".to_string(),
            request_id: "req-1".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["maxPixels"], "10000000000000");
        assert_eq!(value["requestId"], "req-1");
        assert_eq!(
            value["fileExportOptions"]["driveDestination"]["filenamePrefix"],
            "12-2024-01-nicfi"
        );
        assert_eq!(value["grid"]["crsCode"], "EPSG:4326");
    }

    #[test]
    fn test_operation_list_parses() {
        let body = json!({
            "operations": [
                {
                    "name": "projects/p/operations/ABC",
                    "metadata": {"@type": "type.googleapis.com/google.earthengine.v1.OperationMetadata",
                                 "state": "RUNNING", "description": "export_1_2024-01"}
                },
                {"name": "projects/p/operations/DEF", "done": true}
            ],
            "nextPageToken": "page2"
        });

        let parsed: ListOperationsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.operations.len(), 2);
        assert_eq!(
            parsed.operations[0].metadata.as_ref().unwrap().state.as_deref(),
            Some("RUNNING")
        );
        assert!(parsed.operations[1].done);
        assert_eq!(parsed.next_page_token.as_deref(), Some("page2"));
    }

    #[test]
    fn test_compute_features_parses_polygon() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]},
                "properties": {"Index": 12}
            }]
        });

        let parsed: ComputeFeaturesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.features.len(), 1);
        assert!(matches!(parsed.features[0].geometry, Some(Geometry::Polygon(_))));
    }
}
