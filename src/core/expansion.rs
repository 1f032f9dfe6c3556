//! Recurring series expansion - pure occurrence generation.
//!
//! Turns a series definition (start, pattern, optional bounds) into the
//! ordered, finite list of occurrence start times. Expansion itself cannot
//! fail for a valid pattern; pattern strings are validated before expansion
//! begins. A hard ceiling of [`MAX_OCCURRENCES`] bounds every expansion,
//! including a series configured with neither `end_date` nor
//! `max_occurrences`.

use crate::errors::{Error, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::str::FromStr;

/// Hard ceiling on the number of occurrences a single series can expand to.
/// Applies regardless of the configured bounds and is not user-configurable.
pub const MAX_OCCURRENCES: usize = 1000;

/// How a series steps from one occurrence to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrencePattern {
    /// Every 7 days
    Weekly,
    /// Every 14 days
    BiWeekly,
    /// Same day-of-month in the next month, December rolling over to January
    Monthly,
}

impl RecurrencePattern {
    /// The wire/store representation of this pattern.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::BiWeekly => "bi_weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Returns the start time of the occurrence after `current`.
    #[must_use]
    pub fn advance(self, current: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Weekly => current + Duration::days(7),
            Self::BiWeekly => current + Duration::days(14),
            Self::Monthly => add_one_month(current),
        }
    }
}

impl FromStr for RecurrencePattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "bi_weekly" => Ok(Self::BiWeekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(Error::Validation {
                message: format!("unknown recurrence pattern: {other:?}"),
            }),
        }
    }
}

/// Moves a datetime to the same day-of-month in the following month,
/// preserving the time of day. December rolls over to January of the next
/// year. When the next month is shorter, the day is clamped down to its last
/// valid day (Jan 31 -> Feb 28/29).
fn add_one_month(current: DateTime<Utc>) -> DateTime<Utc> {
    let date = current.date_naive();
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    let mut day = date.day();
    let next_date = loop {
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
            break d;
        }
        // Day 1 always exists, so this terminates before underflow.
        day -= 1;
    };

    next_date.and_time(current.time()).and_utc()
}

/// Expands a series definition into its ordered occurrence start times.
///
/// Emission stops when the next occurrence would fall on a later day than
/// `end_date` (inclusive, compared at date granularity - an occurrence on
/// the end date itself is emitted even if `end_date` carries a midnight
/// time), when `max_occurrences` have been emitted, or unconditionally at
/// [`MAX_OCCURRENCES`]. With neither bound set the hard cap is the only
/// terminator.
#[must_use]
pub fn expand_occurrences(
    start: DateTime<Utc>,
    pattern: RecurrencePattern,
    end_date: Option<DateTime<Utc>>,
    max_occurrences: Option<u32>,
) -> Vec<DateTime<Utc>> {
    let mut occurrences = Vec::new();
    let mut current = start;

    loop {
        if let Some(end) = end_date {
            if current.date_naive() > end.date_naive() {
                break;
            }
        }
        if let Some(max) = max_occurrences {
            if occurrences.len() >= max as usize {
                break;
            }
        }
        if occurrences.len() >= MAX_OCCURRENCES {
            break;
        }

        occurrences.push(current);
        current = pattern.advance(current);
    }

    occurrences
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_pattern_parsing() {
        assert_eq!(
            "weekly".parse::<RecurrencePattern>().unwrap(),
            RecurrencePattern::Weekly
        );
        assert_eq!(
            "bi_weekly".parse::<RecurrencePattern>().unwrap(),
            RecurrencePattern::BiWeekly
        );
        assert_eq!(
            "monthly".parse::<RecurrencePattern>().unwrap(),
            RecurrencePattern::Monthly
        );
        assert!(matches!(
            "daily".parse::<RecurrencePattern>().unwrap_err(),
            Error::Validation { message: _ }
        ));
    }

    #[test]
    fn test_weekly_expansion_with_end_date() {
        // 2025-03-01 14:00 weekly until 2025-03-22 => exactly four Saturdays.
        let occurrences = expand_occurrences(
            utc(2025, 3, 1, 14, 0),
            RecurrencePattern::Weekly,
            Some(utc(2025, 3, 22, 23, 59)),
            None,
        );

        assert_eq!(
            occurrences,
            vec![
                utc(2025, 3, 1, 14, 0),
                utc(2025, 3, 8, 14, 0),
                utc(2025, 3, 15, 14, 0),
                utc(2025, 3, 22, 14, 0),
            ]
        );
    }

    #[test]
    fn test_end_date_is_inclusive() {
        let occurrences = expand_occurrences(
            utc(2025, 3, 1, 14, 0),
            RecurrencePattern::Weekly,
            Some(utc(2025, 3, 8, 14, 0)),
            None,
        );
        assert_eq!(occurrences.len(), 2);
    }

    #[test]
    fn test_midnight_end_date_keeps_final_occurrence() {
        // A date-only bound arrives as midnight; the 14:00 occurrence on the
        // end date itself must still be emitted.
        let occurrences = expand_occurrences(
            utc(2025, 3, 1, 14, 0),
            RecurrencePattern::Weekly,
            Some(utc(2025, 3, 22, 0, 0)),
            None,
        );
        assert_eq!(occurrences.len(), 4);
        assert_eq!(occurrences[3], utc(2025, 3, 22, 14, 0));
    }

    #[test]
    fn test_bi_weekly_step() {
        let occurrences = expand_occurrences(
            utc(2025, 1, 6, 18, 30),
            RecurrencePattern::BiWeekly,
            None,
            Some(3),
        );
        assert_eq!(
            occurrences,
            vec![
                utc(2025, 1, 6, 18, 30),
                utc(2025, 1, 20, 18, 30),
                utc(2025, 2, 3, 18, 30),
            ]
        );
    }

    #[test]
    fn test_monthly_keeps_day_and_time() {
        let occurrences = expand_occurrences(
            utc(2025, 10, 15, 9, 0),
            RecurrencePattern::Monthly,
            None,
            Some(4),
        );
        assert_eq!(
            occurrences,
            vec![
                utc(2025, 10, 15, 9, 0),
                utc(2025, 11, 15, 9, 0),
                utc(2025, 12, 15, 9, 0),
                // December rolls over to January of the next year.
                utc(2026, 1, 15, 9, 0),
            ]
        );
    }

    #[test]
    fn test_monthly_clamps_short_months() {
        let occurrences = expand_occurrences(
            utc(2025, 1, 31, 12, 0),
            RecurrencePattern::Monthly,
            None,
            Some(2),
        );
        assert_eq!(occurrences[1], utc(2025, 2, 28, 12, 0));
    }

    #[test]
    fn test_max_occurrences_bound() {
        let occurrences = expand_occurrences(
            utc(2025, 3, 1, 14, 0),
            RecurrencePattern::Weekly,
            None,
            Some(10),
        );
        assert_eq!(occurrences.len(), 10);
    }

    #[test]
    fn test_unbounded_series_hits_hard_cap() {
        let occurrences =
            expand_occurrences(utc(2025, 3, 1, 14, 0), RecurrencePattern::Weekly, None, None);
        assert_eq!(occurrences.len(), MAX_OCCURRENCES);
    }

    #[test]
    fn test_hard_cap_overrides_larger_max() {
        let occurrences = expand_occurrences(
            utc(2025, 3, 1, 14, 0),
            RecurrencePattern::Weekly,
            None,
            Some(5000),
        );
        assert_eq!(occurrences.len(), MAX_OCCURRENCES);
    }

    #[test]
    fn test_zero_max_occurrences_emits_nothing() {
        let occurrences = expand_occurrences(
            utc(2025, 3, 1, 14, 0),
            RecurrencePattern::Weekly,
            None,
            Some(0),
        );
        assert!(occurrences.is_empty());
    }

    #[test]
    fn test_occurrences_are_strictly_chronological() {
        let occurrences = expand_occurrences(
            utc(2025, 1, 31, 12, 0),
            RecurrencePattern::Monthly,
            None,
            Some(24),
        );
        assert!(occurrences.windows(2).all(|w| w[0] < w[1]));
    }
}
