//! Date intervals

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used on the command line and in remote filters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A non-empty `[start, end)` pair of calendar dates
///
/// Normally produced by [`crate::core::partition::partition`]; intervals are
/// never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateInterval {
    /// Creates an interval, rejecting empty or inverted ranges
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end <= start {
            return Err(format!("interval end {end} must be after start {start}"));
        }
        Ok(Self { start, end })
    }

    /// First day of the interval
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Day the interval ends on
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days between start and end
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_interval_creation() {
        let interval = DateInterval::new(date(2024, 1, 1), date(2024, 2, 1)).unwrap();
        assert_eq!(interval.start(), date(2024, 1, 1));
        assert_eq!(interval.end(), date(2024, 2, 1));
        assert_eq!(interval.num_days(), 31);
        assert_eq!(interval.to_string(), "2024-01-01..2024-02-01");
    }

    #[test]
    fn test_interval_rejects_empty() {
        assert!(DateInterval::new(date(2024, 1, 1), date(2024, 1, 1)).is_err());
        assert!(DateInterval::new(date(2024, 2, 1), date(2024, 1, 1)).is_err());
    }
}
