//! Dashboard Routes
//!
//! Render views for a selection given as query parameters.
//!
//! - GET /api/v1/dashboard - Every output
//! - GET /api/v1/bar-chart - Bar chart descriptor
//! - GET /api/v1/map - Map descriptor
//! - GET /api/v1/summary - Summary strings
//! - GET /api/v1/outputs/:output - One output by name

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::SelectionQuery;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::dashboard::{
    build_bar_chart, build_map, build_summary, BarChartFigure, DashboardView, MapFigure,
    OutputId, OutputValue, Selection, SummaryText,
};

fn selection_from(state: &AppState, query: &SelectionQuery) -> ApiResult<Selection> {
    Ok(state
        .dashboard
        .parse_selection(query.state.as_deref(), query.month.as_deref())?)
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelectionQuery>,
) -> ApiResult<Json<DashboardView>> {
    let selection = selection_from(&state, &query)?;
    Ok(Json(state.dashboard.render(&selection)))
}

/// GET /api/v1/bar-chart
pub async fn get_bar_chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelectionQuery>,
) -> ApiResult<Json<BarChartFigure>> {
    let selection = selection_from(&state, &query)?;
    Ok(Json(build_bar_chart(state.dashboard.dataset(), &selection)))
}

/// GET /api/v1/map
pub async fn get_map(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelectionQuery>,
) -> ApiResult<Json<MapFigure>> {
    let selection = selection_from(&state, &query)?;
    Ok(Json(build_map(
        state.dashboard.dataset(),
        state.dashboard.settings(),
        &selection,
    )))
}

/// GET /api/v1/summary
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelectionQuery>,
) -> ApiResult<Json<SummaryText>> {
    let selection = selection_from(&state, &query)?;
    Ok(Json(build_summary(state.dashboard.dataset(), &selection)))
}

/// GET /api/v1/outputs/:output
pub async fn get_output(
    State(state): State<Arc<AppState>>,
    Path(output): Path<String>,
    Query(query): Query<SelectionQuery>,
) -> ApiResult<Json<OutputValue>> {
    let output: OutputId = output.parse()?;
    let selection = selection_from(&state, &query)?;
    Ok(Json(state.dashboard.render_output(&selection, output)))
}
