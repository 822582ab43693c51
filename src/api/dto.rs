//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::dashboard::{Selection, SelectionEvent};
use crate::dataset::{DatasetStats, Month};

// ============================================
// SELECTION DTOs
// ============================================

/// Selection as query parameters (`?state=Oregon&month=Aug`)
///
/// Kept as raw strings so an invalid month surfaces as a typed error
/// rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
}

/// Stateless dispatch request
#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    /// Selection before the event; defaults to the initial selection
    #[serde(default)]
    pub selection: Option<Selection>,
    /// The interaction to apply
    pub event: SelectionEvent,
}

impl DispatchRequest {
    /// Parse a request body
    ///
    /// Malformed JSON is a validation error; a bad month in the selection or
    /// the event is reported as an invalid month.
    pub fn from_slice(body: &[u8]) -> ApiResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| ApiError::Validation(format!("Invalid dispatch request: {}", e)))?;

        let selection = match value.get("selection") {
            Some(selection) if !selection.is_null() => {
                Some(Selection::from_json(selection.clone())?)
            }
            _ => None,
        };

        let event = value.get("event").cloned().ok_or_else(|| {
            ApiError::Validation("Invalid dispatch request: missing field `event`".to_string())
        })?;

        Ok(Self {
            selection,
            event: SelectionEvent::from_json(event)?,
        })
    }
}

// ============================================
// OPTIONS DTOs
// ============================================

/// One dropdown entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

/// Contents of both dropdowns
#[derive(Debug, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub states: Vec<DropdownOption>,
    pub months: Vec<DropdownOption>,
    pub default_state: String,
}

impl OptionsResponse {
    pub fn month_options() -> Vec<DropdownOption> {
        Month::ALL
            .iter()
            .map(|m| DropdownOption {
                label: m.code().to_string(),
                value: m.code().to_string(),
            })
            .collect()
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    pub dataset: DatasetStats,
    pub sessions: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
