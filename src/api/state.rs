//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::dashboard::Dashboard;
use crate::websocket::{HubConfig, SessionHub};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Dataset and map settings; read-only after startup
    pub dashboard: Arc<Dashboard>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Live session hub
    pub sessions: Arc<SessionHub>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(dashboard: Arc<Dashboard>, config: ApiConfig) -> Self {
        let hub_config = HubConfig {
            max_sessions: config.max_sessions,
        };

        Self {
            dashboard,
            config: Arc::new(config),
            start_time: Instant::now(),
            sessions: Arc::new(SessionHub::new(hub_config)),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get live session count
    pub async fn session_count(&self) -> usize {
        self.sessions.session_count().await
    }
}
