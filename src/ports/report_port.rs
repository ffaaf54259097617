//! Report generation port trait.

use chrono::NaiveDate;

use crate::domain::analytics::{self, SummaryStats};
use crate::domain::error::JournalError;
use crate::domain::trade::TradeEntry;

/// Everything a report needs: the entries in date order and their summary.
#[derive(Debug, Clone)]
pub struct JournalReport {
    pub title: String,
    pub entries: Vec<TradeEntry>,
    pub summary: SummaryStats,
    /// Inclusive filter bounds; either may be open.
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl JournalReport {
    /// Build a report over `entries` restricted to `[start, end]`. A missing
    /// bound leaves that side of the range open.
    pub fn build(
        title: impl Into<String>,
        entries: &[TradeEntry],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Self {
        let mut selected = analytics::filter_by_date_range(entries, start, end);
        analytics::sort_by_date(&mut selected);
        let summary = analytics::summary_stats(&selected);
        JournalReport {
            title: title.into(),
            entries: selected,
            summary,
            start,
            end,
        }
    }

    /// Label for the filter, or `None` for an unfiltered report.
    pub fn range_label(&self) -> Option<String> {
        analytics::date_range_label(self.start, self.end)
    }
}

/// Port for writing journal reports.
pub trait ReportPort {
    fn write(&self, report: &JournalReport, output_path: &str) -> Result<(), JournalError>;
}
