//! Dispatch Route
//!
//! - POST /api/v1/dispatch - Apply one interaction to a client-held selection
//!
//! The stateless counterpart of a live session: the client sends its current
//! selection with the event and receives the new selection plus only the
//! outputs that changed.

use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;

use crate::api::dto::DispatchRequest;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::dashboard::DispatchResult;

/// POST /api/v1/dispatch
pub async fn dispatch_event(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<DispatchResult>> {
    // Parsed by hand so invalid months get the INVALID_MONTH error body
    let req = DispatchRequest::from_slice(&body)?;

    let current = req
        .selection
        .unwrap_or_else(|| state.dashboard.initial_selection());

    Ok(Json(state.dashboard.dispatch(&current, req.event)))
}
