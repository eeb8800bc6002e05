//! Calendar math for analysis windows
//!
//! An [`AnalysisWindow`] is an inclusive date range parsed up front, so that
//! a malformed date string is a typed error instead of silently producing a
//! zero working-day count.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Inclusive date range for one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse a window from `YYYY-MM-DD` strings.
    ///
    /// Fails with [`AnalysisError::InvalidDate`] on the first string that
    /// does not parse. A start after the end is accepted and simply yields
    /// an empty range.
    pub fn parse(start: &str, end: &str) -> Result<Self, AnalysisError> {
        Ok(Self {
            start: parse_date(start)?,
            end: parse_date(end)?,
        })
    }

    /// Number of non-weekend days in the window, inclusive of both ends.
    ///
    /// Returns 0 when the range is empty (start after end).
    pub fn working_days(&self) -> u32 {
        working_days_between(self.start, self.end)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, AnalysisError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AnalysisError::InvalidDate(s.to_string()))
}

/// Count calendar days from `start` to `end` inclusive whose weekday is not
/// Saturday or Sunday. Pure, no side effects.
pub fn working_days_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        return 0;
    }

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}
