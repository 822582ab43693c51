//! Bar Chart Builder
//!
//! Builds the per-month detection histogram for the selected state. The
//! month only affects which bar is highlighted, never the counts.

use serde::Serialize;

use super::selection::Selection;
use crate::dataset::{Dataset, Month};

/// Color of the bar matching the selected month
pub const HIGHLIGHT_COLOR: &str = "#FFFFFF";

/// Diverging palette, indexed by [`Month::index`]
pub const MONTH_PALETTE: [&str; 12] = [
    "#F4EC15", "#DAF017", "#BBEC19", "#9DE81B", "#80E41D", "#66E01F", "#4CDC20", "#34D822",
    "#24D249", "#25D042", "#26CC58", "#28C86D",
];

pub const BACKGROUND_COLOR: &str = "#323130";

/// Complete bar chart descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartFigure {
    pub state: String,
    pub bars: Vec<Bar>,
    pub layout: BarChartLayout,
}

/// One month's bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub month: Month,
    /// X position (month number)
    pub x: u8,
    pub count: u64,
    pub color: &'static str,
    pub highlighted: bool,
}

/// Presentation settings consumed by the charting library
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartLayout {
    pub bargap: f64,
    pub bargroupgap: f64,
    pub barmode: &'static str,
    pub dragmode: &'static str,
    pub showlegend: bool,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    pub font_color: &'static str,
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub annotations: Vec<BarAnnotation>,
}

/// Count label drawn above a bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarAnnotation {
    pub x: u8,
    pub y: u64,
    pub text: String,
}

/// Color for a month's bar given the current selection
pub fn bar_color(month: Month, selected: Option<Month>) -> &'static str {
    if selected == Some(month) {
        HIGHLIGHT_COLOR
    } else {
        MONTH_PALETTE[month.index()]
    }
}

/// Build the bar chart for the selected state
///
/// Always returns 12 bars in calendar order. Months with no aggregate row,
/// and states absent from the aggregate table, produce zero-height bars.
pub fn build_bar_chart(dataset: &Dataset, selection: &Selection) -> BarChartFigure {
    let counts = dataset.monthly_counts(&selection.state);

    let bars: Vec<Bar> = Month::ALL
        .iter()
        .map(|&month| Bar {
            month,
            x: month.number(),
            count: counts[month.index()],
            color: bar_color(month, selection.month),
            highlighted: selection.month == Some(month),
        })
        .collect();

    let max = counts.iter().copied().max().unwrap_or(0) as f64;
    // Leave headroom above the tallest bar for its annotation
    let y_max = if max > 0.0 { max + max / 4.0 } else { 1.0 };

    let annotations = bars
        .iter()
        .map(|bar| BarAnnotation {
            x: bar.x,
            y: bar.count,
            text: bar.count.to_string(),
        })
        .collect();

    BarChartFigure {
        state: selection.state.clone(),
        bars,
        layout: BarChartLayout {
            bargap: 0.01,
            bargroupgap: 0.0,
            barmode: "group",
            dragmode: "select",
            showlegend: false,
            plot_bgcolor: BACKGROUND_COLOR,
            paper_bgcolor: BACKGROUND_COLOR,
            font_color: "white",
            x_range: [0.5, 12.5],
            y_range: [0.0, y_max],
            annotations,
        },
    }
}
