//! # Report Ranges
//!
//! Turns local calendar dates into the UTC instants the sales report
//! filters on.
//!
//! ## Range Semantics
//! ```text
//! local day 2026-10-19 in UTC+7
//!
//!   [ 2026-10-19 00:00 +07:00 , 2026-10-20 00:00 +07:00 )
//!              │                          │
//!              ▼                          ▼
//!   [ 2026-10-18T17:00:00Z    , 2026-10-19T17:00:00Z    )
//!
//!   start inclusive, end exclusive: 23:59:59.999 is inside the day.
//! ```
//!
//! Timestamps are stored as UTC, so comparing them against these bounds is
//! independent of the server's zone once the range is built.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Half-open instant range `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Builds a range from explicit instants. `start` must precede `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> ValidationResult<Self> {
        if start >= end {
            return Err(ValidationError::InvalidRange {
                field: "date range".to_string(),
                reason: "start must be before end".to_string(),
            });
        }

        Ok(DateRange { start, end })
    }

    /// The local calendar day `date` in `tz`.
    pub fn local_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> ValidationResult<Self> {
        Self::for_dates(tz, date, date)
    }

    /// Today in `tz`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use kasir_core::report::DateRange;
    ///
    /// let today = DateRange::today(&Utc).unwrap();
    /// assert!(today.start <= Utc::now());
    /// ```
    pub fn today<Tz: TimeZone>(tz: &Tz) -> ValidationResult<Self> {
        let date = Utc::now().with_timezone(tz).date_naive();
        Self::local_day(tz, date)
    }

    /// Inclusive span of local calendar dates, from the first instant of
    /// `start` up to (excluding) the first instant of the day after `end`.
    pub fn for_dates<Tz: TimeZone>(
        tz: &Tz,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ValidationResult<Self> {
        if start > end {
            return Err(ValidationError::InvalidRange {
                field: "start_date".to_string(),
                reason: "must not be after end_date".to_string(),
            });
        }

        let after_end = end.succ_opt().ok_or_else(|| ValidationError::Overflow {
            field: "end_date".to_string(),
        })?;

        Self::new(start_of_day(tz, start)?, start_of_day(tz, after_end)?)
    }
}

/// First instant of `date` in `tz`, as UTC.
///
/// Zones whose DST transition skips midnight start the day at the first
/// representable hour after it.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> ValidationResult<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);

    (0..24)
        .find_map(|hour| {
            tz.from_local_datetime(&(midnight + Duration::hours(hour)))
                .earliest()
        })
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| ValidationError::InvalidRange {
            field: "date".to_string(),
            reason: format!("{} has no local midnight", date),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_local_day_in_utc() {
        let range = DateRange::local_day(&Utc, date(2026, 10, 19)).unwrap();
        assert_eq!(range.start, utc("2026-10-19T00:00:00Z"));
        assert_eq!(range.end, utc("2026-10-20T00:00:00Z"));
    }

    #[test]
    fn test_local_day_with_offset() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        let range = DateRange::local_day(&wib, date(2026, 10, 19)).unwrap();
        assert_eq!(range.start, utc("2026-10-18T17:00:00Z"));
        assert_eq!(range.end, utc("2026-10-19T17:00:00Z"));
    }

    #[test]
    fn test_last_second_of_day_is_included() {
        let range = DateRange::local_day(&Utc, date(2026, 10, 19)).unwrap();
        assert_eq!(range.start, utc("2026-10-19T00:00:00Z"));
        assert_eq!(range.end, utc("2026-10-20T00:00:00Z"));
        assert!(utc("2026-10-19T23:59:59.999Z") < range.end);
    }

    #[test]
    fn test_for_dates_is_inclusive() {
        let range = DateRange::for_dates(&Utc, date(2026, 10, 1), date(2026, 10, 3)).unwrap();
        assert_eq!(range.start, utc("2026-10-01T00:00:00Z"));
        assert_eq!(range.end, utc("2026-10-04T00:00:00Z"));
    }

    #[test]
    fn test_for_dates_rejects_reversed_range() {
        let err = DateRange::for_dates(&Utc, date(2026, 10, 5), date(2026, 10, 1)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRange { .. }));
    }

    #[test]
    fn test_new_rejects_empty_range() {
        let at = utc("2026-10-19T10:00:00Z");
        assert!(DateRange::new(at, at).is_err());
    }

    #[test]
    fn test_today_starts_before_now() {
        let range = DateRange::today(&Utc).unwrap();
        let now = Utc::now();
        assert!(range.start <= now);
        assert!(range.end - range.start >= chrono::Duration::hours(23));
    }
}
