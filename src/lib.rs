//! # Firemap
//!
//! Interactive wildfire detection dashboard: a month-by-month bar chart of
//! detections for a chosen state, a map of detection points for the chosen
//! month, and summary totals, all driven by one shared selection.
//!
//! ## Modules
//!
//! - [`dataset`]: Detection points, state/month aggregates and locations
//! - [`dashboard`]: Selection reducer, update graph and view builders
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Live sessions holding a selection per client
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use firemap::dashboard::{Dashboard, MapSettings, SelectionEvent, SelectionManager};
//! use firemap::dataset::{DatasetLoader, Month};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = DatasetLoader::new("data/fire_points.csv", "data/state_months.csv").load()?;
//!     let dashboard = Dashboard::new(Arc::new(dataset), MapSettings::default());
//!
//!     let mut selection = SelectionManager::new(dashboard.initial_selection());
//!     let transition = selection.apply(SelectionEvent::BarClicked { month: Month::Aug });
//!
//!     let update = dashboard.render_transition(&transition);
//!     println!("{} outputs changed", update.outputs.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod websocket;

// Re-export top-level types for convenience
pub use dataset::{
    Dataset, DatasetError, DatasetLoader, DatasetResult, DatasetStats, FireDetectionRecord,
    LocationOfInterest, Month, StateMonthAggregate,
};

pub use dashboard::{
    Dashboard, DashboardError, DashboardView, DispatchResult, InputId, MapSettings, OutputId,
    OutputValue, Selection, SelectionEvent, SelectionManager, Transition,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{
    websocket_handler, ClientMessage, HubConfig, HubError, ServerMessage, SessionHub,
};

pub use config::{ApiConfig, Config, ConfigError, DataConfig, LoggingConfig, MapConfig};
