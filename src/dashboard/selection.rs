//! Selection State
//!
//! The only mutable state in the dashboard is the user's selection. It is
//! updated by a pure reducer: `Selection + SelectionEvent → Transition`.
//! [`SelectionManager`] wraps the reducer for callers that hold a selection
//! across events, such as a live session.
//!
//! Chart events (bar clicks and range/lasso selections) always end with the
//! chart's selection overlay cleared, so the next interaction is read as a
//! fresh single choice rather than an accumulating multi-select.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{DashboardError, DashboardResult};
use super::graph::{affected_outputs, InputId, OutputId};
use crate::dataset::{Dataset, Month, MonthParseError};

/// Current (state, month) selection
///
/// The state always has a value: a new selection starts at the dataset's
/// default state. `month == None` means no month has been picked yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub state: String,
    #[serde(default)]
    pub month: Option<Month>,
}

impl Selection {
    pub fn new(state: impl Into<String>, month: Option<Month>) -> Self {
        Self {
            state: state.into(),
            month,
        }
    }

    /// Selection shown before any user interaction
    pub fn initial(dataset: &Dataset) -> Self {
        Self::new(dataset.default_state(), None)
    }

    /// Decode a selection sent by a client
    ///
    /// A bad month is reported as [`DashboardError::InvalidMonth`].
    pub fn from_json(value: Value) -> DashboardResult<Self> {
        check_months(&value)?;
        serde_json::from_value(value).map_err(|e| DashboardError::InvalidEvent(e.to_string()))
    }
}

/// A user interaction that may change the selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionEvent {
    /// State dropdown changed. Unknown names are accepted as-is.
    SetState { state: String },
    /// Month dropdown changed or cleared
    SetMonth {
        #[serde(default)]
        month: Option<Month>,
    },
    /// A single bar was clicked
    BarClicked { month: Month },
    /// A range or lasso selection was made over the bars, in selection order
    RangeSelected { months: Vec<Month> },
    /// The chart's selection overlay was cleared
    ClearChartSelection,
}

impl SelectionEvent {
    /// Decode an event sent by a client
    ///
    /// Month fields are checked first, so a bad month is reported as
    /// [`DashboardError::InvalidMonth`] rather than a shape error.
    pub fn from_json(value: Value) -> DashboardResult<Self> {
        check_months(&value)?;
        serde_json::from_value(value).map_err(|e| DashboardError::InvalidEvent(e.to_string()))
    }
}

fn month_from_json(value: &Value) -> Result<Month, MonthParseError> {
    match value {
        Value::String(s) => s.parse(),
        Value::Number(n) => n.to_string().parse(),
        other => Err(MonthParseError(other.to_string())),
    }
}

/// Validate the `month` and `months` fields of a JSON object, if present
fn check_months(value: &Value) -> Result<(), MonthParseError> {
    if let Some(month) = value.get("month").filter(|m| !m.is_null()) {
        month_from_json(month)?;
    }
    if let Some(Value::Array(months)) = value.get("months") {
        for month in months {
            month_from_json(month)?;
        }
    }
    Ok(())
}

/// Result of applying one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Selection after the event
    pub selection: Selection,
    /// Inputs whose value changed
    pub changed_inputs: Vec<InputId>,
    /// Whether the client must reset the chart's selection overlay
    pub clear_overlay: bool,
}

impl Transition {
    /// Outputs that must be recomputed after this transition
    pub fn outputs(&self) -> Vec<OutputId> {
        affected_outputs(&self.changed_inputs)
    }

    /// True when no input changed
    pub fn is_noop(&self) -> bool {
        self.changed_inputs.is_empty()
    }
}

/// Apply an event to a selection
pub fn reduce(current: &Selection, event: SelectionEvent) -> Transition {
    let (next, clear_overlay) = match event {
        SelectionEvent::SetState { state } => (Selection::new(state, current.month), false),
        SelectionEvent::SetMonth { month } => (Selection::new(current.state.clone(), month), false),
        SelectionEvent::BarClicked { month } => {
            (Selection::new(current.state.clone(), Some(month)), true)
        }
        SelectionEvent::RangeSelected { months } => {
            // The last point in the selection wins; an empty range keeps the month
            let month = months.last().copied().or(current.month);
            (Selection::new(current.state.clone(), month), true)
        }
        SelectionEvent::ClearChartSelection => (current.clone(), true),
    };

    let mut changed_inputs = Vec::new();
    if next.state != current.state {
        changed_inputs.push(InputId::State);
    }
    if next.month != current.month {
        changed_inputs.push(InputId::Month);
    }

    Transition {
        selection: next,
        changed_inputs,
        clear_overlay,
    }
}

/// Holds a selection across events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionManager {
    selection: Selection,
}

impl SelectionManager {
    pub fn new(initial: Selection) -> Self {
        Self { selection: initial }
    }

    /// Current selection
    pub fn current(&self) -> &Selection {
        &self.selection
    }

    /// Apply an event and keep the resulting selection
    pub fn apply(&mut self, event: SelectionEvent) -> Transition {
        let transition = reduce(&self.selection, event);
        self.selection = transition.selection.clone();
        transition
    }

    pub fn set_state(&mut self, state: impl Into<String>) -> Transition {
        self.apply(SelectionEvent::SetState {
            state: state.into(),
        })
    }

    pub fn set_month(&mut self, month: Option<Month>) -> Transition {
        self.apply(SelectionEvent::SetMonth { month })
    }

    pub fn clear_chart_selection(&mut self) -> Transition {
        self.apply(SelectionEvent::ClearChartSelection)
    }

    /// Replace the selection wholesale (session reset)
    pub fn reset(&mut self, selection: Selection) -> Transition {
        let mut changed_inputs = Vec::new();
        if selection.state != self.selection.state {
            changed_inputs.push(InputId::State);
        }
        if selection.month != self.selection.month {
            changed_inputs.push(InputId::Month);
        }
        self.selection = selection.clone();

        Transition {
            selection,
            changed_inputs,
            clear_overlay: true,
        }
    }
}
