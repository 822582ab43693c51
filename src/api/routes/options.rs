//! Options Routes
//!
//! - GET /api/v1/options - Dropdown contents for the state and month controls

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{DropdownOption, OptionsResponse};
use crate::api::state::AppState;

/// GET /api/v1/options
///
/// States come from the location table, in configured order.
pub async fn list_options(State(state): State<Arc<AppState>>) -> Json<OptionsResponse> {
    let dataset = state.dashboard.dataset();

    let states = dataset
        .locations()
        .iter()
        .map(|l| DropdownOption {
            label: l.name.clone(),
            value: l.name.clone(),
        })
        .collect();

    Json(OptionsResponse {
        states,
        months: OptionsResponse::month_options(),
        default_state: dataset.default_state().to_string(),
    })
}
