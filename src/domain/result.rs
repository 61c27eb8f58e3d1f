//! Result type alias for geexport

use super::errors::GeeError;

/// Result type alias for geexport operations
///
/// # Examples
///
/// ```
/// use geexport::domain::result::Result;
/// use geexport::domain::errors::GeeError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(GeeError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, GeeError>;
