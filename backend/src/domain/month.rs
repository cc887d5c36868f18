//! Calendar month keys and weekday enumeration.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use thiserror::Error;

/// Error returned when a month key cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month '{input}': expected YYYY-MM or YYYY-MM-DD")]
pub struct ParseMonthKeyError {
    /// The rejected input.
    pub input: String,
}

/// One calendar month, rendered as `YYYY-MM`.
///
/// Internally the key stores the first day of the month, so every derived
/// date is already known to be valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    first_day: NaiveDate,
}

impl MonthKey {
    /// The month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// Build a key from a year and a 1-based month number.
    #[must_use]
    pub fn from_ym(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// Resolve an optional external month argument.
    ///
    /// Absent or unparseable input falls back to the month of `today`.
    ///
    /// # Examples
    ///
    /// ```
    /// use canteen::domain::MonthKey;
    /// use chrono::NaiveDate;
    ///
    /// let today = NaiveDate::from_ymd_opt(2025, 11, 18).expect("valid date");
    /// assert_eq!(MonthKey::resolve(Some("2025-12"), today).to_string(), "2025-12");
    /// assert_eq!(MonthKey::resolve(Some("2025-12-09"), today).to_string(), "2025-12");
    /// assert_eq!(MonthKey::resolve(Some("december"), today).to_string(), "2025-11");
    /// assert_eq!(MonthKey::resolve(None, today).to_string(), "2025-11");
    /// ```
    #[must_use]
    pub fn resolve(raw: Option<&str>, today: NaiveDate) -> Self {
        raw.and_then(|value| value.parse().ok())
            .unwrap_or_else(|| Self::containing(today))
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// 1-based month number.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// Whether `date` falls inside this month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Whether `date` is a Monday–Friday inside this month.
    #[must_use]
    pub fn contains_weekday(&self, date: NaiveDate) -> bool {
        self.contains(date) && is_weekday(date)
    }

    /// The Monday–Friday dates of the month, in calendar order.
    #[must_use]
    pub fn weekdays(&self) -> Vec<NaiveDate> {
        self.first_day
            .iter_days()
            .take_while(|date| self.contains(*date))
            .filter(|date| is_weekday(*date))
            .collect()
    }

    /// The `YYYY-MM` form used in storage keys.
    #[must_use]
    pub fn storage_key(&self) -> String {
        self.to_string()
    }
}

/// Monday through Friday.
#[must_use]
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthKey {
    type Err = ParseMonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
            .map(Self::containing)
            .map_err(|_| ParseMonthKeyError {
                input: s.to_owned(),
            })
    }
}
