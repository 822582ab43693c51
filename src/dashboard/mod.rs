//! Dashboard Views
//!
//! The selection model and the pure view builders derived from it:
//!
//! - **selection**: Selection state, events and the reducer
//! - **graph**: Static input → output dependency wiring
//! - **bar_chart**: Per-month histogram for the selected state
//! - **map_view**: Detection points for the selected month
//! - **summary**: Display totals
//! - **view**: `Dashboard`, which renders full views and dispatch results
//!
//! # Update Flow
//!
//! ```text
//! SelectionEvent ─→ reduce(Selection) ─→ Transition { changed_inputs }
//!                                              │
//!                         affected_outputs ←───┘
//!                                │
//!                                └─→ render_outputs ─→ Vec<OutputValue>
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use firemap::dashboard::{Dashboard, MapSettings, SelectionEvent};
//! use firemap::dataset::{DatasetLoader, Month};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = Arc::new(DatasetLoader::new("points.csv", "aggregates.csv").load()?);
//!     let dashboard = Dashboard::new(dataset, MapSettings::default());
//!
//!     let selection = dashboard.initial_selection();
//!     let result = dashboard.dispatch(&selection, SelectionEvent::BarClicked { month: Month::Aug });
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!
//!     Ok(())
//! }
//! ```

pub mod bar_chart;
pub mod error;
pub mod format;
pub mod graph;
pub mod map_view;
pub mod selection;
pub mod summary;
pub mod view;

pub use bar_chart::{build_bar_chart, Bar, BarChartFigure, HIGHLIGHT_COLOR, MONTH_PALETTE};
pub use error::{DashboardError, DashboardResult};
pub use format::format_thousands;
pub use graph::{affected_outputs, InputId, OutputId};
pub use map_view::{build_map, GeoPoint, MapFigure, MapSettings, Viewport};
pub use selection::{reduce, Selection, SelectionEvent, SelectionManager, Transition};
pub use summary::{build_summary, SummaryText};
pub use view::{Dashboard, DashboardView, DispatchResult, OutputValue};
