//! Dashboard error types

use thiserror::Error;

use crate::dataset::MonthParseError;

/// Errors raised while interpreting user input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// Month value outside the 12-entry month enum
    #[error(transparent)]
    InvalidMonth(#[from] MonthParseError),

    /// Event or selection that is not well-formed
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Output name not known to the update graph
    #[error("Unknown output: {0}")]
    UnknownOutput(String),
}

/// Result type alias for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;
