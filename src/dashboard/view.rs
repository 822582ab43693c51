//! Dashboard Renderer
//!
//! Ties the dataset, the map settings and the view builders together.
//! Rendering is a pure function of (dataset, settings, selection): the same
//! selection always serializes to the same bytes.

use serde::Serialize;
use std::sync::Arc;

use super::bar_chart::{build_bar_chart, BarChartFigure};
use super::error::DashboardResult;
use super::graph::{InputId, OutputId};
use super::map_view::{build_map, MapFigure, MapSettings};
use super::selection::{reduce, Selection, SelectionEvent, Transition};
use super::summary::{
    build_summary, month_label_text, selection_total_text, total_fires_text, SummaryText,
};
use crate::dataset::{Dataset, Month};

/// Every output for one selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: Selection,
    pub bar_chart: BarChartFigure,
    pub map: MapFigure,
    pub summary: SummaryText,
}

/// A single recomputed output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "output", content = "value", rename_all = "snake_case")]
pub enum OutputValue {
    BarChart(BarChartFigure),
    Map(MapFigure),
    TotalFires(String),
    SelectionTotal(String),
    MonthLabel(String),
    MonthDropdown(Option<Month>),
}

impl OutputValue {
    pub fn id(&self) -> OutputId {
        match self {
            OutputValue::BarChart(_) => OutputId::BarChart,
            OutputValue::Map(_) => OutputId::Map,
            OutputValue::TotalFires(_) => OutputId::TotalFires,
            OutputValue::SelectionTotal(_) => OutputId::SelectionTotal,
            OutputValue::MonthLabel(_) => OutputId::MonthLabel,
            OutputValue::MonthDropdown(_) => OutputId::MonthDropdown,
        }
    }
}

/// Outcome of dispatching an event: the new selection and its dirty outputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResult {
    pub selection: Selection,
    pub changed_inputs: Vec<InputId>,
    pub clear_overlay: bool,
    pub outputs: Vec<OutputValue>,
}

/// Read-only dashboard over a loaded dataset
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Arc<Dataset>,
    settings: MapSettings,
}

impl Dashboard {
    pub fn new(dataset: Arc<Dataset>, settings: MapSettings) -> Self {
        Self { dataset, settings }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    /// Selection before any interaction
    pub fn initial_selection(&self) -> Selection {
        Selection::initial(&self.dataset)
    }

    /// Build a selection from raw query values
    ///
    /// A missing or empty state falls back to the default state; a missing or
    /// empty month means no month selected. Invalid months are an error.
    pub fn parse_selection(
        &self,
        state: Option<&str>,
        month: Option<&str>,
    ) -> DashboardResult<Selection> {
        let state = match state.map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => self.dataset.default_state().to_string(),
        };

        let month = match month.map(str::trim) {
            Some(m) if !m.is_empty() => Some(m.parse::<Month>()?),
            _ => None,
        };

        Ok(Selection::new(state, month))
    }

    /// Render all outputs
    pub fn render(&self, selection: &Selection) -> DashboardView {
        DashboardView {
            selection: selection.clone(),
            bar_chart: build_bar_chart(&self.dataset, selection),
            map: build_map(&self.dataset, &self.settings, selection),
            summary: build_summary(&self.dataset, selection),
        }
    }

    /// Render one output
    pub fn render_output(&self, selection: &Selection, output: OutputId) -> OutputValue {
        match output {
            OutputId::BarChart => OutputValue::BarChart(build_bar_chart(&self.dataset, selection)),
            OutputId::Map => OutputValue::Map(build_map(&self.dataset, &self.settings, selection)),
            OutputId::TotalFires => OutputValue::TotalFires(total_fires_text(&self.dataset)),
            OutputId::SelectionTotal => {
                OutputValue::SelectionTotal(selection_total_text(&self.dataset, selection))
            }
            OutputId::MonthLabel => OutputValue::MonthLabel(month_label_text(selection.month)),
            OutputId::MonthDropdown => OutputValue::MonthDropdown(selection.month),
        }
    }

    pub fn render_outputs(&self, selection: &Selection, outputs: &[OutputId]) -> Vec<OutputValue> {
        outputs
            .iter()
            .map(|output| self.render_output(selection, *output))
            .collect()
    }

    /// Render the outputs dirtied by a transition
    pub fn render_transition(&self, transition: &Transition) -> DispatchResult {
        let outputs = self.render_outputs(&transition.selection, &transition.outputs());

        DispatchResult {
            selection: transition.selection.clone(),
            changed_inputs: transition.changed_inputs.clone(),
            clear_overlay: transition.clear_overlay,
            outputs,
        }
    }

    /// Apply an event to a selection and render what changed
    pub fn dispatch(&self, current: &Selection, event: SelectionEvent) -> DispatchResult {
        let transition = reduce(current, event);

        tracing::debug!(
            state = %transition.selection.state,
            month = ?transition.selection.month,
            changed = ?transition.changed_inputs,
            "Selection updated"
        );

        self.render_transition(&transition)
    }
}
