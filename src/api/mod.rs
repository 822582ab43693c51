//! Firemap REST API
//!
//! HTTP API layer for the dashboard, built with Axum.
//!
//! # Endpoints
//!
//! ## Controls
//! - `GET /api/v1/options` - State and month dropdown contents
//!
//! ## Views
//! - `GET /api/v1/dashboard?state=&month=` - Every output for a selection
//! - `GET /api/v1/bar-chart?state=&month=` - Bar chart descriptor
//! - `GET /api/v1/map?state=&month=` - Map descriptor
//! - `GET /api/v1/summary?state=&month=` - Summary strings
//! - `GET /api/v1/outputs/:output?state=&month=` - One output by name
//!
//! ## Interaction
//! - `POST /api/v1/dispatch` - Apply an event to a selection
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /ws` - Live session
//!
//! # Example
//!
//! ```rust,ignore
//! use firemap::api::{serve, AppState};
//! use firemap::config::Config;
//! use firemap::dashboard::Dashboard;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default()?;
//!     let dataset = Arc::new(config.dataset_loader().load()?);
//!     let dashboard = Arc::new(Dashboard::new(dataset, config.map.settings()));
//!
//!     let state = AppState::new(dashboard, config.api.clone());
//!     serve(state, &config.api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ApiConfig;
use crate::websocket::websocket_handler;

/// Build the CORS layer from the configured origins
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_layer(&state.config);

    let api_routes = Router::new()
        // Control routes
        .route("/options", get(routes::options::list_options))
        // View routes
        .route("/dashboard", get(routes::dashboard::get_dashboard))
        .route("/bar-chart", get(routes::dashboard::get_bar_chart))
        .route("/map", get(routes::dashboard::get_map))
        .route("/summary", get(routes::dashboard::get_summary))
        .route("/outputs/:output", get(routes::dashboard::get_output))
        // Interaction routes
        .route("/dispatch", post(routes::dispatch::dispatch_event))
        .layer(TimeoutLayer::new(timeout));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        // Live sessions are long-lived, so no request timeout here
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Firemap API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Firemap API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{Dashboard, MapSettings};
    use crate::dataset::{default_locations, Dataset, FireDetectionRecord, Month, StateMonthAggregate};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let dataset = Dataset::new(
            vec![
                FireDetectionRecord::new(47.1, -120.1, 1500, Month::Aug),
                FireDetectionRecord::new(44.2, -121.3, 5, Month::Aug),
                FireDetectionRecord::new(38.0, -119.9, 7, Month::Jul),
            ],
            vec![
                StateMonthAggregate::new("Washington", Month::Aug, 1205),
                StateMonthAggregate::new("Washington", Month::Jul, 40),
                StateMonthAggregate::new("Oregon", Month::Aug, 75),
            ],
            default_locations(),
        )
        .unwrap();

        let dashboard = Arc::new(Dashboard::new(Arc::new(dataset), MapSettings::default()));
        build_router(AppState::new(dashboard, ApiConfig::default()))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_live() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (status, json) = get_json(create_test_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["dataset"]["point_rows"], 3);
        assert_eq!(json["sessions"], 0);
    }

    #[tokio::test]
    async fn test_options() {
        let (status, json) = get_json(create_test_app(), "/api/v1/options").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["default_state"], "Washington");
        assert_eq!(json["states"].as_array().unwrap().len(), 3);
        assert_eq!(json["months"].as_array().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_dashboard_washington_august() {
        let (status, json) =
            get_json(create_test_app(), "/api/v1/dashboard?state=Washington&month=Aug").await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(
            json["summary"]["selection_total"],
            "Total Pings in Selection: 1,205"
        );
        assert_eq!(json["summary"]["month_label"], "in the month: Aug");
        assert_eq!(json["summary"]["total_fires"], "Total Number of fires: 1,512");
        assert_eq!(json["map"]["points"]["lat"].as_array().unwrap().len(), 2);
        assert_eq!(json["bar_chart"]["bars"][7]["color"], "#FFFFFF");
        assert_eq!(json["bar_chart"]["bars"][7]["count"], 1205);
    }

    #[tokio::test]
    async fn test_dashboard_defaults_without_query() {
        let (status, json) = get_json(create_test_app(), "/api/v1/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["selection"]["state"], "Washington");
        assert_eq!(json["selection"]["month"], Value::Null);
    }

    #[tokio::test]
    async fn test_dashboard_invalid_month() {
        let (status, json) =
            get_json(create_test_app(), "/api/v1/dashboard?state=Oregon&month=13").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_MONTH");
    }

    #[tokio::test]
    async fn test_dashboard_is_deterministic() {
        let uri = "/api/v1/dashboard?state=Oregon&month=Aug";
        let (_, first) = get_json(create_test_app(), uri).await;
        let (_, second) = get_json(create_test_app(), uri).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_individual_outputs() {
        let (status, json) =
            get_json(create_test_app(), "/api/v1/bar-chart?state=Oregon&month=8").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["bars"].as_array().unwrap().len(), 12);

        let (status, json) =
            get_json(create_test_app(), "/api/v1/map?state=California&month=Jul").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["viewport"]["zoom"], 12.0);
        assert_eq!(json["points"]["counts"], serde_json::json!([7]));

        let (status, json) = get_json(create_test_app(), "/api/v1/summary?month=Jul").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["selection_total"], "Total Pings in Selection: 40");

        let (status, json) =
            get_json(create_test_app(), "/api/v1/outputs/month_label?month=Jul").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["output"], "month_label");
        assert_eq!(json["value"], "in the month: Jul");

        let (status, _) = get_json(create_test_app(), "/api/v1/outputs/pie_chart").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dispatch_bar_click() {
        let (status, json) = post_json(
            create_test_app(),
            "/api/v1/dispatch",
            r#"{"selection": {"state": "Washington", "month": "Jan"},
                "event": {"type": "bar_clicked", "month": "Aug"}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["selection"]["month"], "Aug");
        assert_eq!(json["clear_overlay"], true);
        assert_eq!(json["changed_inputs"], serde_json::json!(["month"]));
        assert_eq!(json["outputs"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_dispatch_state_change_without_selection() {
        let (status, json) = post_json(
            create_test_app(),
            "/api/v1/dispatch",
            r#"{"event": {"type": "set_state", "state": "Oregon"}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["selection"]["state"], "Oregon");
        assert_eq!(json["clear_overlay"], false);

        let outputs: Vec<&str> = json["outputs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["output"].as_str().unwrap())
            .collect();
        assert_eq!(outputs, vec!["bar_chart", "map", "selection_total"]);
    }

    #[tokio::test]
    async fn test_dispatch_invalid() {
        let (status, json) = post_json(
            create_test_app(),
            "/api/v1/dispatch",
            r#"{"event": {"type": "bar_clicked", "month": "Smarch"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_MONTH");

        let (status, json) = post_json(
            create_test_app(),
            "/api/v1/dispatch",
            r#"{"event": {"type": "set_month", "month": "13"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_MONTH");

        let (status, json) = post_json(
            create_test_app(),
            "/api/v1/dispatch",
            r#"{"event": {"type": "teleport"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_EVENT");

        let (status, json) = post_json(create_test_app(), "/api/v1/dispatch", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }
}
