// geexport - Batch export scheduler for Earth Engine imagery
// Copyright (c) 2025 GeeExport Contributors
// Licensed under the MIT License

//! # geexport - batch export scheduler for per-feature imagery
//!
//! geexport submits one Earth Engine export task per (date interval, feature)
//! pair: a composite image for the interval, clipped to a rectangle sized
//! from the feature's polygon, written to a Drive folder. The account allows
//! only a limited number of active tasks, so submission proceeds in batches
//! and pauses, polling the task list, whenever a batch reaches the ceiling.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Date partitioning, region sizing, submission and scheduling
//! - [`adapters`] - The Earth Engine REST client behind async traits
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust
//! use geexport::core::partition::partition;
//! use geexport::core::region::date_label;
//! use geexport::domain::SourceKind;
//!
//! // Sentinel composites come in three windows per month
//! let intervals = partition("2024-01-01", "2024-02-01", SourceKind::Sentinel).unwrap();
//! assert_eq!(intervals.len(), 3);
//! assert_eq!(date_label(&intervals[1], SourceKind::Sentinel), "20240111");
//! ```
//!
//! Running an export end to end is shown in [`core`].
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`]. Per-job failures are recorded in
//! the run summary and never abort a run; [`domain::GeeError::InvalidDateRange`]
//! and [`domain::GeeError::RunAborted`] do. A run that fails after it has
//! started submitting returns its summary with `aborted` set, so the submitted
//! count is never lost.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
