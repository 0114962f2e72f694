//! Calendar month model.
//!
//! This module contains [`YearMonth`], used both as the pay period of a
//! statement and as the month stamp of the last leave accrual.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, EngineResult};

/// A calendar month, e.g. March 2026.
///
/// Serialized as `"YYYY-MM"`.
///
/// # Example
///
/// ```
/// use payroll_engine::models::YearMonth;
///
/// let february = YearMonth::new(2024, 2).unwrap();
/// assert_eq!(february.days_in_month(), 29);
/// assert_eq!(february.to_string(), "2024-02");
///
/// assert!(YearMonth::new(2024, 13).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    /// Creates a month, rejecting months outside 1..=12 and years before 1.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if year < 1 {
            return Err(EngineError::InvalidPeriod { year, month });
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or(EngineError::InvalidPeriod { year, month })
    }

    /// Returns the month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The month number, 1..=12.
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Number of days in the month.
    ///
    /// Computed as the distance between the first of this month and the
    /// first of the next one, so leap Februaries come out right.
    pub fn days_in_month(&self) -> u32 {
        match self.first_day.checked_add_months(Months::new(1)) {
            Some(next) => (next - self.first_day).num_days() as u32,
            None => 31,
        }
    }

    /// Iterates the day numbers of the month, `1..=days_in_month`.
    pub fn days(&self) -> impl Iterator<Item = u32> {
        1..=self.days_in_month()
    }

    /// Returns true if `day` is a valid day number in this month.
    pub fn contains_day(&self, day: u32) -> bool {
        (1..=self.days_in_month()).contains(&day)
    }

    /// Whole months elapsed from `earlier` to `self`.
    ///
    /// Negative when `earlier` is actually later.
    pub fn months_since(&self, earlier: YearMonth) -> i64 {
        i64::from(self.year() - earlier.year()) * 12 + i64::from(self.month())
            - i64::from(earlier.month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = EngineError;

    /// Parses `"YYYY-MM"`; the month may omit its leading zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = EngineError::InvalidPeriod { year: 0, month: 0 };
        let (year, month) = s.trim().split_once('-').ok_or(invalid)?;
        let year: i32 = year
            .parse()
            .map_err(|_| EngineError::InvalidPeriod { year: 0, month: 0 })?;
        let month: u32 = month
            .parse()
            .map_err(|_| EngineError::InvalidPeriod { year, month: 0 })?;
        Self::new(year, month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_days_in_month_for_every_length() {
        assert_eq!(ym(2026, 1).days_in_month(), 31);
        assert_eq!(ym(2026, 4).days_in_month(), 30);
        assert_eq!(ym(2026, 2).days_in_month(), 28);
        assert_eq!(ym(2024, 2).days_in_month(), 29);
        assert_eq!(ym(1900, 2).days_in_month(), 28);
        assert_eq!(ym(2000, 2).days_in_month(), 29);
        assert_eq!(ym(2026, 12).days_in_month(), 31);
    }

    #[test]
    fn test_days_iterates_whole_month() {
        let days: Vec<u32> = ym(2026, 2).days().collect();
        assert_eq!(days.first(), Some(&1));
        assert_eq!(days.last(), Some(&28));
        assert_eq!(days.len(), 28);
    }

    #[test]
    fn test_invalid_months_are_rejected() {
        assert!(matches!(
            YearMonth::new(2026, 0),
            Err(EngineError::InvalidPeriod {
                year: 2026,
                month: 0
            })
        ));
        assert!(YearMonth::new(2026, 13).is_err());
        assert!(YearMonth::new(0, 5).is_err());
    }

    #[test]
    fn test_of_truncates_to_first_day() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(YearMonth::of(date), ym(2026, 10));
        assert_eq!(
            YearMonth::of(date).first_day(),
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()
        );
    }

    #[test]
    fn test_months_since_crosses_years() {
        assert_eq!(ym(2026, 3).months_since(ym(2025, 11)), 4);
        assert_eq!(ym(2026, 3).months_since(ym(2026, 3)), 0);
        assert_eq!(ym(2026, 3).months_since(ym(2026, 5)), -2);
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(ym(2026, 3).to_string(), "2026-03");
        assert_eq!("2026-03".parse::<YearMonth>().unwrap(), ym(2026, 3));
        assert_eq!("2026-3".parse::<YearMonth>().unwrap(), ym(2026, 3));
        assert!("2026/03".parse::<YearMonth>().is_err());
        assert!("march".parse::<YearMonth>().is_err());
        assert!("2026-13".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let json = serde_json::to_string(&ym(2025, 7)).unwrap();
        assert_eq!(json, "\"2025-07\"");

        let parsed: YearMonth = serde_json::from_str("\"2025-07\"").unwrap();
        assert_eq!(parsed, ym(2025, 7));

        assert!(serde_json::from_str::<YearMonth>("\"garbage\"").is_err());
    }

    #[test]
    fn test_contains_day() {
        let april = ym(2026, 4);
        assert!(april.contains_day(1));
        assert!(april.contains_day(30));
        assert!(!april.contains_day(31));
        assert!(!april.contains_day(0));
    }
}
