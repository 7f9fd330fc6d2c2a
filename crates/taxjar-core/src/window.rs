//! Extraction window: the inclusive range of UTC calendar days a run covers.

use std::fmt::{Display, Formatter};
use std::iter::FusedIterator;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::ValidationError;

/// Lookback used when the configuration does not name one.
pub const DEFAULT_DAYS_BACK: i64 = 21;

/// Inclusive `[start, end]` range of calendar days, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionWindow {
    start: Date,
    end: Date,
}

impl ExtractionWindow {
    /// Window ending on the UTC calendar day of `now`.
    pub fn ending_at(days_back: i64, now: OffsetDateTime) -> Result<Self, ValidationError> {
        if days_back < 0 {
            return Err(ValidationError::NegativeDaysBack { value: days_back });
        }

        let end = now.to_offset(UtcOffset::UTC).date();
        let start = i32::try_from(days_back)
            .ok()
            .and_then(|lookback| end.to_julian_day().checked_sub(lookback))
            .and_then(|julian_day| Date::from_julian_day(julian_day).ok())
            .ok_or(ValidationError::WindowOutOfRange { value: days_back })?;

        Ok(Self { start, end })
    }

    /// Window ending today (UTC), computed fresh from the system clock.
    pub fn trailing(days_back: i64) -> Result<Self, ValidationError> {
        Self::ending_at(days_back, OffsetDateTime::now_utc())
    }

    pub const fn start(&self) -> Date {
        self.start
    }

    pub const fn end(&self) -> Date {
        self.end
    }

    /// Number of days in the window (`days_back + 1`).
    pub fn day_count(&self) -> usize {
        (self.end - self.start).whole_days() as usize + 1
    }

    /// Lazily walks the window one day at a time; each call starts over.
    pub fn days(&self) -> WindowDays {
        WindowDays {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl Display for ExtractionWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", query_date(self.start), query_date(self.end))
    }
}

impl IntoIterator for &ExtractionWindow {
    type Item = Date;
    type IntoIter = WindowDays;

    fn into_iter(self) -> Self::IntoIter {
        self.days()
    }
}

/// Iterator over the days of an [`ExtractionWindow`].
#[derive(Debug, Clone)]
pub struct WindowDays {
    next: Option<Date>,
    end: Date,
}

impl Iterator for WindowDays {
    type Item = Date;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|day| *day <= self.end)?;
        self.next = current.next_day();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            Some(day) if day <= self.end => (self.end - day).whole_days() as usize + 1,
            _ => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for WindowDays {}

impl FusedIterator for WindowDays {}

const QUERY_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]/[month]/[day]");

/// Formats a day the way the list endpoint expects it: `YYYY/MM/DD`.
pub fn query_date(date: Date) -> String {
    date.format(QUERY_DATE).unwrap_or_else(|_| date.to_string())
}
