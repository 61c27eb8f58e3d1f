//! Date range partitioning
//!
//! Splits a `[start, end)` date range into the composite windows a source
//! publishes: calendar months for monthly sources, and three bins per month
//! (days 1-10, 11-20, 21-last) for sub-monthly sources. Output is always
//! chronological and never empty for a valid range.
//!
//! A sub-monthly month's last bin ends on the month's last day, not on the
//! first of the next month. A range ending on the 1st therefore stops at the
//! previous month's last day: `2024-02-01..2024-03-01` ends on `2024-02-29`.

use crate::domain::interval::DATE_FORMAT;
use crate::domain::{Cadence, DateInterval, GeeError, Result, SourceKind};
use chrono::{Datelike, Months, NaiveDate};

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
        GeeError::InvalidDateRange(format!("'{raw}' is not a valid YYYY-MM-DD date: {e}"))
    })
}

/// Partition a date range given as strings
///
/// # Errors
///
/// Returns [`GeeError::InvalidDateRange`] if either date fails to parse or
/// `end <= start`.
///
/// # Example
///
/// ```
/// use geexport::core::partition::partition;
/// use geexport::domain::SourceKind;
///
/// let intervals = partition("2024-01-01", "2024-04-01", SourceKind::Nicfi).unwrap();
/// assert_eq!(intervals.len(), 3);
/// ```
pub fn partition(start: &str, end: &str, source: SourceKind) -> Result<Vec<DateInterval>> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    partition_dates(start, end, source)
}

/// Partition a date range given as dates
pub fn partition_dates(
    start: NaiveDate,
    end: NaiveDate,
    source: SourceKind,
) -> Result<Vec<DateInterval>> {
    if end <= start {
        return Err(GeeError::InvalidDateRange(format!(
            "end date {end} must be after start date {start}"
        )));
    }

    let mut intervals = Vec::new();
    let mut month = first_of_month(start);
    while month < end {
        let next_month = add_month(month)?;
        match source.cadence() {
            Cadence::Monthly => intervals.push(interval(month, next_month)?),
            Cadence::SubMonthly => {
                let last_day = next_month.pred_opt().ok_or_else(|| out_of_range(next_month))?;
                intervals.push(interval(month, with_day(month, 10)?)?);
                intervals.push(interval(with_day(month, 11)?, with_day(month, 20)?)?);
                intervals.push(interval(with_day(month, 21)?, last_day)?);
            }
        }
        month = next_month;
    }

    Ok(intervals)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month
    date.with_day(1).unwrap_or(date)
}

fn add_month(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(1))
        .ok_or_else(|| out_of_range(date))
}

fn with_day(month: NaiveDate, day: u32) -> Result<NaiveDate> {
    month.with_day(day).ok_or_else(|| out_of_range(month))
}

fn interval(start: NaiveDate, end: NaiveDate) -> Result<DateInterval> {
    DateInterval::new(start, end).map_err(GeeError::InvalidDateRange)
}

fn out_of_range(date: NaiveDate) -> GeeError {
    GeeError::InvalidDateRange(format!("date range around {date} exceeds the calendar"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_quarter() {
        let intervals = partition("2024-01-01", "2024-04-01", SourceKind::Nicfi).unwrap();
        let pairs: Vec<_> = intervals.iter().map(|i| (i.start(), i.end())).collect();
        assert_eq!(
            pairs,
            vec![
                (date(2024, 1, 1), date(2024, 2, 1)),
                (date(2024, 2, 1), date(2024, 3, 1)),
                (date(2024, 3, 1), date(2024, 4, 1)),
            ]
        );
    }

    #[test]
    fn test_monthly_truncates_start_and_covers_end() {
        let intervals = partition("2024-01-15", "2024-03-10", SourceKind::Nicfi).unwrap();
        assert_eq!(intervals.len(), 3);
        assert_eq!(intervals[0].start(), date(2024, 1, 1));
        assert_eq!(intervals[2].end(), date(2024, 4, 1));
    }

    #[test]
    fn test_monthly_crosses_year() {
        let intervals = partition("2023-12-01", "2024-02-01", SourceKind::Nicfi).unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].end(), date(2024, 1, 1));
        assert_eq!(intervals[1].start(), date(2024, 1, 1));
    }

    #[test]
    fn test_sub_monthly_bins() {
        let intervals = partition("2024-01-01", "2024-01-31", SourceKind::Sentinel).unwrap();
        let pairs: Vec<_> = intervals.iter().map(|i| (i.start(), i.end())).collect();
        assert_eq!(
            pairs,
            vec![
                (date(2024, 1, 1), date(2024, 1, 10)),
                (date(2024, 1, 11), date(2024, 1, 20)),
                (date(2024, 1, 21), date(2024, 1, 31)),
            ]
        );
    }

    #[test_case(2024, 2, 29 ; "leap february")]
    #[test_case(2023, 2, 28 ; "common february")]
    #[test_case(2024, 4, 30 ; "thirty day month")]
    #[test_case(2024, 12, 31 ; "december")]
    fn test_sub_monthly_last_bin_ends_on_last_day(year: i32, month: u32, last: u32) {
        let start = date(year, month, 1);
        let intervals = partition_dates(start, start.succ_opt().unwrap(), SourceKind::Sentinel).unwrap();
        assert_eq!(intervals.len(), 3);
        assert_eq!(intervals[2].start(), date(year, month, 21));
        assert_eq!(intervals[2].end(), date(year, month, last));
    }

    #[test]
    fn test_sub_monthly_starts_mid_month() {
        let intervals = partition("2024-03-15", "2024-05-02", SourceKind::Sentinel).unwrap();
        assert_eq!(intervals.len(), 9);
        assert_eq!(intervals[0].start(), date(2024, 3, 1));
        assert_eq!(intervals[8].end(), date(2024, 5, 31));
    }

    #[test_case("2024-01-01", "2024-01-01" ; "empty range")]
    #[test_case("2024-02-01", "2024-01-01" ; "inverted range")]
    #[test_case("2024-13-01", "2024-14-01" ; "bad month")]
    #[test_case("2023-02-29", "2023-03-01" ; "non leap day")]
    #[test_case("01/01/2024", "2024-02-01" ; "wrong format")]
    fn test_invalid_ranges(start: &str, end: &str) {
        for source in SourceKind::ALL {
            let result = partition(start, end, source);
            assert!(
                matches!(result, Err(GeeError::InvalidDateRange(_))),
                "{start}..{end} for {source} should be rejected"
            );
        }
    }

    #[test]
    fn test_intervals_are_chronological_and_cover_range() {
        let ranges = [
            ("2020-02-29", "2020-03-01"),
            ("2021-06-30", "2022-01-15"),
            ("2019-12-31", "2024-02-29"),
            ("2024-01-10", "2024-01-11"),
        ];

        for (raw_start, raw_end) in ranges {
            let start = parse_date(raw_start).unwrap();
            let end = parse_date(raw_end).unwrap();

            for source in SourceKind::ALL {
                let intervals = partition_dates(start, end, source).unwrap();
                assert!(!intervals.is_empty());
                assert!(intervals[0].start() <= start);
                for pair in intervals.windows(2) {
                    assert!(pair[0].start() < pair[1].start());
                    assert!(pair[0].end() <= pair[1].start());
                }

                let last_end = intervals[intervals.len() - 1].end();
                match source.cadence() {
                    Cadence::Monthly => assert!(last_end >= end),
                    // The last bin ends on the month's last day, so an `end`
                    // on the first of a month is one day past it.
                    Cadence::SubMonthly => assert!(last_end.succ_opt().unwrap() >= end),
                }
            }
        }
    }
}
