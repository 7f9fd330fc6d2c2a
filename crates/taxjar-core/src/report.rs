use time::Date;

use crate::domain::SkipReason;
use crate::window::query_date;

/// A list entry that produced no record, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedOrder {
    /// The entry as listed, which may be blank.
    pub reference: String,
    pub reason: SkipReason,
}

/// Counts for one day of the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: Date,
    /// References returned by the list endpoint.
    pub listed: usize,
    /// Records handed to the sink.
    pub loaded: usize,
    pub skipped: Vec<SkippedOrder>,
}

impl DaySummary {
    pub fn new(date: Date, listed: usize) -> Self {
        Self {
            date,
            listed,
            loaded: 0,
            skipped: Vec::new(),
        }
    }

    pub fn query_date(&self) -> String {
        query_date(self.date)
    }
}

/// Per-day summaries of a completed run, in window order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub days: Vec<DaySummary>,
}

impl ExtractionReport {
    pub fn emitted(&self) -> usize {
        self.days.iter().map(|day| day.loaded).sum()
    }

    pub fn skipped(&self) -> usize {
        self.days.iter().map(|day| day.skipped.len()).sum()
    }

    pub fn listed(&self) -> usize {
        self.days.iter().map(|day| day.listed).sum()
    }
}
