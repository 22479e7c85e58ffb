use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DcaError;
use crate::DcaResult;

/// First month of the contribution plan. Every ledger starts here.
pub const START_MONTH: MonthKey = MonthKey {
    year: 2025,
    month: 1,
};

/// A calendar month. Orders by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "MonthKeyRepr", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

/// Accepted wire shapes: `"2025-01"`, `{ "y": 2025, "m": 1 }` or
/// `{ "year": 2025, "month": 1 }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum MonthKeyRepr {
    Text(String),
    Short { y: i32, m: u32 },
    Long { year: i32, month: u32 },
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> DcaResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DcaError::DateError(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(DcaError::DateError(format!(
                "year must be between 1 and 9999, got {year}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The given day of this month, if it exists.
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// Months since year 0, for distance arithmetic.
    fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = DcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (y, m) = trimmed
            .split_once('-')
            .ok_or_else(|| DcaError::DateError(format!("expected YYYY-MM, got '{trimmed}'")))?;
        let year = y
            .parse::<i32>()
            .map_err(|_| DcaError::DateError(format!("invalid year in '{trimmed}'")))?;
        let month = m
            .parse::<u32>()
            .map_err(|_| DcaError::DateError(format!("invalid month in '{trimmed}'")))?;
        MonthKey::new(year, month)
    }
}

impl TryFrom<MonthKeyRepr> for MonthKey {
    type Error = DcaError;

    fn try_from(repr: MonthKeyRepr) -> Result<Self, Self::Error> {
        match repr {
            MonthKeyRepr::Text(s) => s.parse(),
            MonthKeyRepr::Short { y, m } => MonthKey::new(y, m),
            MonthKeyRepr::Long { year, month } => MonthKey::new(year, month),
        }
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Every month from `start` to `end`, both inclusive. Empty if `end < start`.
pub fn month_range(start: MonthKey, end: MonthKey) -> Vec<MonthKey> {
    let mut months = Vec::with_capacity(months_between_inclusive(start, end) as usize);
    let mut current = start;
    while current <= end {
        months.push(current);
        current = current.next();
    }
    months
}

/// Number of months in `start..=end`, 0 if `end < start`.
pub fn months_between_inclusive(start: MonthKey, end: MonthKey) -> u32 {
    if end < start {
        return 0;
    }
    u32::try_from(end.ordinal() - start.ordinal() + 1).unwrap_or(u32::MAX)
}
