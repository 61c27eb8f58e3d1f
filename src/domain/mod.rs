//! Domain models and types for geexport.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed values** ([`FeatureIndex`], [`TaskId`], [`SourceKind`], [`DateInterval`])
//! - **Geometry** ([`Geometry`], [`Bounds`], [`Feature`])
//! - **Job models** ([`ExportJob`], [`ExportRegion`], [`RemoteTaskHandle`])
//! - **Error types** ([`GeeError`], [`RemoteError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, GeeError>`]:
//!
//! ```rust
//! use geexport::domain::{GeeError, Result};
//! use std::str::FromStr;
//!
//! fn parse_source(raw: &str) -> Result<geexport::domain::SourceKind> {
//!     geexport::domain::SourceKind::from_str(raw).map_err(GeeError::Validation)
//! }
//! # assert!(parse_source("nicfi").is_ok());
//! ```

pub mod errors;
pub mod geometry;
pub mod ids;
pub mod interval;
pub mod job;
pub mod result;
pub mod source;

// Re-export commonly used types for convenience
pub use errors::{GeeError, RemoteError, RunPhase};
pub use geometry::{Bounds, Feature, Geometry, Position};
pub use ids::{FeatureIndex, TaskId};
pub use interval::DateInterval;
pub use job::{ExportJob, ExportRegion, RemoteTaskHandle, SizeTier, TaskState};
pub use result::Result;
pub use source::{Cadence, SourceKind};
