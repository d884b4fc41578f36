use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive calendar range: both `start` and `end` belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The calendar month that contains `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        DateRange { start, end }
    }

    /// The calendar year that contains `date`.
    pub fn year_of(date: NaiveDate) -> Self {
        let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
        let end = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
        DateRange { start, end }
    }

    /// The `days` days ending on `end`, inclusive. `days == 0` is treated as 1.
    pub fn last_days(end: NaiveDate, days: u32) -> Self {
        let span = u64::from(days.max(1) - 1);
        let start = end
            .checked_sub_days(chrono::Days::new(span))
            .unwrap_or(NaiveDate::MIN);
        DateRange { start, end }
    }

    /// Parses a `YYYY-MM` month label.
    pub fn parse_month(label: &str) -> Option<Self> {
        let first = NaiveDate::parse_from_str(&format!("{}-01", label.trim()), "%Y-%m-%d").ok()?;
        Some(Self::month_of(first))
    }
}
