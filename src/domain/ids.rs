//! Domain identifier types with validation
//!
//! Newtype wrappers so a feature index and a remote task id can't be mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Integer index of a feature in the shared feature collection
///
/// Matches the `Index` property of the collection's features.
///
/// # Examples
///
/// ```
/// use geexport::domain::ids::FeatureIndex;
/// use std::str::FromStr;
///
/// let index = FeatureIndex::from_str("1823").unwrap();
/// assert_eq!(index.value(), 1823);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureIndex(i64);

impl FeatureIndex {
    /// Creates a new FeatureIndex
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw index value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FeatureIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Feature index cannot be empty".to_string());
        }

        // Target lists exported from spreadsheets often carry "12.0"
        if let Ok(value) = trimmed.parse::<i64>() {
            return Ok(Self(value));
        }
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
        match trimmed.parse::<f64>() {
            Ok(value)
                if value.fract() == 0.0
                    && value >= i64::MIN as f64
                    && value < i64::MAX as f64 =>
            {
                Ok(Self(value as i64))
            }
            _ => Err(format!("Invalid feature index: '{trimmed}'")),
        }
    }
}

impl From<i64> for FeatureIndex {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Remote task identifier
///
/// The id the processing service assigned to an export task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new TaskId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Task ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Builds a task id from an operation resource name
    ///
    /// `projects/my-project/operations/ABCDEF` becomes `ABCDEF`.
    pub fn from_operation_name(name: &str) -> Result<Self, String> {
        let id = name.rsplit('/').next().unwrap_or(name);
        Self::new(id)
    }

    /// Returns the task ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
