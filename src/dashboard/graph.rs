//! Update Graph
//!
//! Static wiring between the two dashboard inputs and the derived outputs.
//! Every output declares the inputs it reads; when a transition changes a set
//! of inputs, exactly the outputs reading any of them are recomputed.
//!
//! ```text
//! state ──┬──→ bar_chart
//!         ├──→ map
//!         └──→ selection_total
//! month ──┬──→ bar_chart (highlight)
//!         ├──→ map
//!         ├──→ total_fires
//!         ├──→ selection_total
//!         ├──→ month_label
//!         └──→ month_dropdown (echo of bar clicks)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::DashboardError;

/// A user-controlled input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputId {
    /// State dropdown
    State,
    /// Month dropdown (also written by bar clicks)
    Month,
}

/// A derived output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputId {
    BarChart,
    Map,
    TotalFires,
    SelectionTotal,
    MonthLabel,
    MonthDropdown,
}

impl OutputId {
    /// All outputs in render order
    pub const ALL: [OutputId; 6] = [
        OutputId::BarChart,
        OutputId::Map,
        OutputId::TotalFires,
        OutputId::SelectionTotal,
        OutputId::MonthLabel,
        OutputId::MonthDropdown,
    ];

    /// Inputs this output is recomputed from
    pub fn inputs(self) -> &'static [InputId] {
        match self {
            OutputId::BarChart => &[InputId::State, InputId::Month],
            OutputId::Map => &[InputId::State, InputId::Month],
            // The global total ignores the selection but is still refreshed on month changes
            OutputId::TotalFires => &[InputId::Month],
            OutputId::SelectionTotal => &[InputId::State, InputId::Month],
            OutputId::MonthLabel => &[InputId::Month],
            OutputId::MonthDropdown => &[InputId::Month],
        }
    }

    /// Whether a change to `input` requires recomputing this output
    pub fn depends_on(self, input: InputId) -> bool {
        self.inputs().contains(&input)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputId::BarChart => "bar_chart",
            OutputId::Map => "map",
            OutputId::TotalFires => "total_fires",
            OutputId::SelectionTotal => "selection_total",
            OutputId::MonthLabel => "month_label",
            OutputId::MonthDropdown => "month_dropdown",
        }
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputId {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        OutputId::ALL
            .iter()
            .copied()
            .find(|o| o.as_str() == normalized)
            .ok_or_else(|| DashboardError::UnknownOutput(s.to_string()))
    }
}

/// Outputs affected by a set of changed inputs, in render order
pub fn affected_outputs(changed: &[InputId]) -> Vec<OutputId> {
    OutputId::ALL
        .iter()
        .copied()
        .filter(|output| changed.iter().any(|input| output.depends_on(*input)))
        .collect()
}
