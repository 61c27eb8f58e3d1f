//! Earth Engine adapter
//!
//! This module provides the remote service contracts the scheduler depends
//! on, and their implementation over the Earth Engine REST API.

pub mod client;
pub mod expression;
pub mod models;
pub mod traits;

pub use client::EarthEngineClient;
pub use traits::{ExportService, ExportTaskRequest, FeatureSource, ImageRef};
