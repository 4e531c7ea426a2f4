//! Calendar-month keys for monthly aggregation windows.
//!
//! Budgets, recurring instances, and spend aggregates are all scoped to a
//! (year, month) pair. `MonthKey` carries that pair with validated contents so
//! date arithmetic (day clamping, range bounds) never has to re-check them.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A (year, month) pair identifying one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    year: i32,
    month: u8,
}

impl MonthKey {
    /// Creates a month key, returning `None` if `month` is outside 1-12.
    #[must_use]
    pub const fn new(year: i32, month: u8) -> Option<Self> {
        if matches!(month, 1..=12) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing the given date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            // A valid NaiveDate month is always 1-12.
            month: u8::try_from(date.month()).unwrap_or(1),
        }
    }

    /// The calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// The month number, 1-12.
    #[must_use]
    pub const fn month(self) -> u8 {
        self.month
    }

    /// Number of days in this month, accounting for leap years.
    #[must_use]
    pub const fn days_in_month(self) -> u32 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 => {
                if is_leap_year(self.year) {
                    29
                } else {
                    28
                }
            }
            _ => 31,
        }
    }

    /// Clamps a requested day-of-month into this month's valid range.
    ///
    /// Day 31 in a 30-day month becomes 30; day 0 becomes 1.
    #[must_use]
    pub const fn clamp_day(self, day: u32) -> u32 {
        let last = self.days_in_month();
        if day < 1 {
            1
        } else if day > last {
            last
        } else {
            day
        }
    }

    /// The date of the given (clamped) day within this month.
    #[must_use]
    pub fn date_on(self, day: u32) -> NaiveDate {
        let day = self.clamp_day(day);
        NaiveDate::from_ymd_opt(self.year, u32::from(self.month), day)
            .unwrap_or(NaiveDate::MIN)
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        self.date_on(1)
    }

    /// Last day of the month.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.date_on(self.days_in_month())
    }

    /// Whether the given date falls inside this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        Self::from_date(date) == self
    }
}

const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2026, 1, 31)]
    #[case(2026, 4, 30)]
    #[case(2026, 2, 28)]
    #[case(2024, 2, 29)]
    #[case(2000, 2, 29)]
    #[case(1900, 2, 28)]
    #[case(2026, 12, 31)]
    fn test_days_in_month(#[case] year: i32, #[case] month: u8, #[case] expected: u32) {
        let key = MonthKey::new(year, month).unwrap();
        assert_eq!(key.days_in_month(), expected);
    }

    #[rstest]
    #[case(31, 30)] // September has 30 days
    #[case(30, 30)]
    #[case(15, 15)]
    #[case(0, 1)]
    fn test_clamp_day_september(#[case] day: u32, #[case] expected: u32) {
        let key = MonthKey::new(2026, 9).unwrap();
        assert_eq!(key.clamp_day(day), expected);
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(MonthKey::new(2026, 0).is_none());
        assert!(MonthKey::new(2026, 13).is_none());
    }

    #[test]
    fn test_range_bounds() {
        let key = MonthKey::new(2026, 2).unwrap();
        assert_eq!(key.first_day(), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(key.last_day(), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }

    #[test]
    fn test_contains() {
        let key = MonthKey::new(2026, 8).unwrap();
        assert!(key.contains(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()));
        assert!(key.contains(NaiveDate::from_ymd_opt(2026, 8, 31).unwrap()));
        assert!(!key.contains(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()));
    }

    #[test]
    fn test_from_date_and_display() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        let key = MonthKey::from_date(date);
        assert_eq!(key.year(), 2026);
        assert_eq!(key.month(), 8);
        assert_eq!(key.to_string(), "2026-08");
    }
}
