//! Fire Detection Dataset
//!
//! This module owns the data every view is computed from:
//!
//! - **types**: Core data structures (Month, FireDetectionRecord, StateMonthAggregate)
//! - **loader**: CSV loading for both input tables
//! - **error**: Error types
//!
//! # Data Flow
//!
//! ```text
//! points.csv ─────┐
//!                 ├─→ DatasetLoader → Dataset (immutable, Arc-shared)
//! aggregates.csv ─┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use firemap::dataset::{DatasetLoader, Month};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = DatasetLoader::new("data/points.csv", "data/aggregates.csv").load()?;
//!
//!     let august: u64 = dataset.points_in_month(Month::Aug).map(|p| p.count).sum();
//!     println!("{} detections in August", august);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod types;

// Re-export commonly used types
pub use error::{DatasetError, DatasetResult};
pub use loader::{
    aggregates_from_str, load_aggregates, load_points, points_from_str, DatasetLoader,
};
pub use types::{
    default_locations, Dataset, DatasetStats, FireDetectionRecord, LocationOfInterest, Month,
    MonthParseError, StateMonthAggregate,
};
