//! Date-range helpers shared by the budget tracker and the report engine.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

use crate::Error;

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// The first date inside the range.
    pub start: Date,
    /// The last date inside the range.
    pub end: Date,
}

impl DateRange {
    /// Create a date range.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidDateRange] if `start` is after `end`.
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidDateRange { start, end });
        }

        Ok(Self { start, end })
    }

    /// Whether `date` falls inside the range. Both bounds are included.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// The ISO week (Monday through Sunday) containing `anchor_date`.
pub fn week_bounds(anchor_date: Date) -> DateRange {
    let weekday_number = anchor_date.weekday().number_from_monday() as i64;
    let start = anchor_date - Duration::days(weekday_number - 1);
    let end = start + Duration::days(6);

    DateRange { start, end }
}

/// The calendar month containing `anchor_date`, first day through last day.
pub fn month_bounds(anchor_date: Date) -> DateRange {
    let year = anchor_date.year();
    let month = anchor_date.month();
    let start = Date::from_calendar_date(year, month, 1).expect("invalid month start date");
    let end = Date::from_calendar_date(year, month, last_day_of_month(year, month))
        .expect("invalid month end date");

    DateRange { start, end }
}

/// The calendar year containing `anchor_date`, January 1 through December 31.
pub fn year_bounds(anchor_date: Date) -> DateRange {
    let year = anchor_date.year();

    DateRange {
        start: Date::from_calendar_date(year, Month::January, 1).expect("invalid year start date"),
        end: Date::from_calendar_date(year, Month::December, 31).expect("invalid year end date"),
    }
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod date_range_tests {
    use time::macros::date;

    use crate::Error;

    use super::DateRange;

    #[test]
    fn new_rejects_start_after_end() {
        let result = DateRange::new(date!(2024 - 12 - 31), date!(2024 - 12 - 01));

        assert_eq!(
            result,
            Err(Error::InvalidDateRange {
                start: date!(2024 - 12 - 31),
                end: date!(2024 - 12 - 01),
            })
        );
    }

    #[test]
    fn new_accepts_single_day_range() {
        let result = DateRange::new(date!(2024 - 12 - 01), date!(2024 - 12 - 01));

        assert!(result.is_ok());
    }

    #[test]
    fn contains_includes_both_bounds() {
        let range = DateRange::new(date!(2024 - 12 - 01), date!(2024 - 12 - 31)).unwrap();

        assert!(range.contains(date!(2024 - 12 - 01)));
        assert!(range.contains(date!(2024 - 12 - 15)));
        assert!(range.contains(date!(2024 - 12 - 31)));
    }

    #[test]
    fn contains_excludes_dates_one_day_outside() {
        let range = DateRange::new(date!(2024 - 12 - 01), date!(2024 - 12 - 31)).unwrap();

        assert!(!range.contains(date!(2024 - 11 - 30)));
        assert!(!range.contains(date!(2025 - 01 - 01)));
    }

    #[test]
    fn display_formats_as_start_to_end() {
        let range = DateRange::new(date!(2024 - 12 - 01), date!(2024 - 12 - 31)).unwrap();

        assert_eq!(range.to_string(), "2024-12-01 to 2024-12-31");
    }
}

#[cfg(test)]
mod bounds_tests {
    use time::macros::date;

    use super::{month_bounds, week_bounds, year_bounds};

    #[test]
    fn week_bounds_runs_monday_through_sunday() {
        // 2024-12-18 is a Wednesday.
        let range = week_bounds(date!(2024 - 12 - 18));

        assert_eq!(range.start, date!(2024 - 12 - 16));
        assert_eq!(range.end, date!(2024 - 12 - 22));
    }

    #[test]
    fn week_bounds_of_a_monday_starts_on_that_day() {
        let range = week_bounds(date!(2024 - 12 - 16));

        assert_eq!(range.start, date!(2024 - 12 - 16));
        assert_eq!(range.end, date!(2024 - 12 - 22));
    }

    #[test]
    fn week_bounds_of_a_sunday_ends_on_that_day() {
        let range = week_bounds(date!(2024 - 12 - 22));

        assert_eq!(range.start, date!(2024 - 12 - 16));
        assert_eq!(range.end, date!(2024 - 12 - 22));
    }

    #[test]
    fn month_bounds_covers_the_whole_month() {
        let range = month_bounds(date!(2024 - 12 - 15));

        assert_eq!(range.start, date!(2024 - 12 - 01));
        assert_eq!(range.end, date!(2024 - 12 - 31));
    }

    #[test]
    fn month_bounds_handles_leap_year_february() {
        let range = month_bounds(date!(2024 - 02 - 10));

        assert_eq!(range.end, date!(2024 - 02 - 29));
    }

    #[test]
    fn month_bounds_handles_non_leap_year_february() {
        let range = month_bounds(date!(2023 - 02 - 10));

        assert_eq!(range.end, date!(2023 - 02 - 28));
    }

    #[test]
    fn month_bounds_handles_century_non_leap_year() {
        let range = month_bounds(date!(1900 - 02 - 10));

        assert_eq!(range.end, date!(1900 - 02 - 28));
    }

    #[test]
    fn year_bounds_covers_the_calendar_year() {
        let range = year_bounds(date!(2024 - 06 - 15));

        assert_eq!(range.start, date!(2024 - 01 - 01));
        assert_eq!(range.end, date!(2024 - 12 - 31));
    }
}
