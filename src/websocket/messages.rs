//! WebSocket Message Types
//!
//! Defines all message types exchanged between a dashboard page and its
//! live session.

use serde::{Deserialize, Serialize};

use crate::dashboard::{DashboardView, DispatchResult, SelectionEvent};

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A user interaction (dropdown change, bar click, range selection)
    Event { event: SelectionEvent },
    /// Return the session to the initial selection
    Reset,
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Session established, with the initial full view
    Connected {
        /// Unique session identifier
        session_id: String,
        view: Box<DashboardView>,
    },
    /// Outputs recomputed after an event
    Update(DispatchResult),
    /// Pong response to ping
    Pong,
    /// Error message; the session stays open
    Error {
        /// Error description
        message: String,
    },
}
