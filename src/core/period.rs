//! Calendar month arithmetic for reports.
//!
//! A [`Period`] is one calendar month. Its window is evaluated in UTC and is
//! half-open, `[first instant of month, first instant of next month)`, which covers
//! every instant up to and including the month's last one.

use crate::errors::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Earliest year a report may be generated for.
pub const MIN_YEAR: i32 = 1970;
/// Latest year a report may be generated for.
pub const MAX_YEAR: i32 = 9999;

/// A validated (year, month) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period, rejecting months outside 1-12 and years outside
    /// [`MIN_YEAR`]..=[`MAX_YEAR`].
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::validation(format!(
                "Month must be between 1 and 12, got {month}"
            )));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(Error::validation(format!(
                "Year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The period containing `instant`.
    #[must_use]
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Calendar month, 1-12.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// The preceding month. January wraps to December of the previous year.
    #[must_use]
    pub const fn previous(self) -> Self {
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

    /// The following month. December wraps to January of the next year.
    #[must_use]
    pub const fn next(self) -> Self {
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

    /// First instant of the month, UTC.
    pub fn start(self) -> Result<DateTime<Utc>> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(|| {
            Error::validation(format!("Invalid period {}/{}", self.year, self.month))
        })?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::validation("Invalid midnight"))?;
        Ok(Utc.from_utc_datetime(&midnight))
    }

    /// `(start, end)` where `end` is the first instant of the following month.
    pub fn window(self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        Ok((self.start()?, self.next().start()?))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}", self.year, self.month)
    }
}
