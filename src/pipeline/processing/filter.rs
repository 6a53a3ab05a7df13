use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::WindowConfig;
use crate::constants::SUMMARY_ROW_MARKER;
use crate::types::RawRecord;

/// Inclusive range of years a record must fall in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub start_year: i32,
    pub end_year: i32,
}

impl YearWindow {
    pub fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }
}

impl From<&WindowConfig> for YearWindow {
    fn from(config: &WindowConfig) -> Self {
        Self::new(config.start_year, config.end_year)
    }
}

/// Monthly summary rows carry a category beginning with `Summary` (case-sensitive).
pub fn is_summary_row(record: &RawRecord) -> bool {
    record.raw_category.starts_with(SUMMARY_ROW_MARKER)
}

/// Records that survived the filter plus tallies of what was dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub kept: Vec<RawRecord>,
    pub out_of_window: usize,
    pub summary_rows: usize,
}

impl FilterOutcome {
    pub fn dropped(&self) -> usize {
        self.out_of_window + self.summary_rows
    }
}

/// Keep records inside `window` that are not summary rows, preserving order.
/// A record outside the window is counted as out of window even if it is also
/// a summary row.
pub fn filter_records(records: Vec<RawRecord>, window: YearWindow) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for record in records {
        if !window.contains(record.year()) {
            outcome.out_of_window += 1;
        } else if is_summary_row(&record) {
            outcome.summary_rows += 1;
        } else {
            outcome.kept.push(record);
        }
    }

    debug!(
        kept = outcome.kept.len(),
        out_of_window = outcome.out_of_window,
        summary_rows = outcome.summary_rows,
        "Filtered records"
    );
    outcome
}
