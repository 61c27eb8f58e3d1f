//! Logging and observability
//!
//! Structured logging via `tracing`:
//! - Human-readable console output
//! - Optional JSON file logging with rotation
//! - Level from the CLI or config, overridable with `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use geexport::config::LoggingConfig;
//! use geexport::logging::init_logging;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(submitted = 12, "Batch submitted");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use geexport::log_error_with_context;
/// use geexport::domain::GeeError;
///
/// let error = GeeError::Configuration("missing project".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// ```no_run
/// use geexport::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, 2000u64, "Server error: 503");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying request after error"
        );
    };
}
