//! Summary Text Builder
//!
//! Three display strings shown next to the controls.

use serde::Serialize;

use super::format::format_thousands;
use super::selection::Selection;
use crate::dataset::{Dataset, Month};

/// Summary strings for the current selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryText {
    pub total_fires: String,
    pub selection_total: String,
    pub month_label: String,
}

/// Total across the whole point table; independent of the selection
pub fn total_fires_text(dataset: &Dataset) -> String {
    format!(
        "Total Number of fires: {}",
        format_thousands(dataset.total_count())
    )
}

/// Aggregate count for the selected state and month
pub fn selection_total(dataset: &Dataset, selection: &Selection) -> u64 {
    selection
        .month
        .map(|month| dataset.aggregate_count(&selection.state, month))
        .unwrap_or(0)
}

pub fn selection_total_text(dataset: &Dataset, selection: &Selection) -> String {
    format!(
        "Total Pings in Selection: {}",
        format_thousands(selection_total(dataset, selection))
    )
}

pub fn month_label_text(month: Option<Month>) -> String {
    match month {
        Some(month) => format!("in the month: {}", month),
        None => "in the month: none selected".to_string(),
    }
}

pub fn build_summary(dataset: &Dataset, selection: &Selection) -> SummaryText {
    SummaryText {
        total_fires: total_fires_text(dataset),
        selection_total: selection_total_text(dataset, selection),
        month_label: month_label_text(selection.month),
    }
}
