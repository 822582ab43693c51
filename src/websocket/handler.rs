//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the session lifecycle.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::SessionHub;
use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;
use crate::dashboard::{
    Dashboard, DashboardError, DispatchResult, OutputId, Selection, SelectionEvent,
};

/// WebSocket upgrade handler
///
/// This is the entry point for live sessions. It upgrades the HTTP
/// connection to WebSocket and starts message handling.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let hub = Arc::clone(&state.sessions);
    let dashboard = Arc::clone(&state.dashboard);
    ws.on_upgrade(move |socket| handle_socket(socket, hub, dashboard))
}

/// Serialize a message for the wire
fn encode(message: &ServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

/// First message of a session: its id and the full view for `initial`
fn connected_message(
    session_id: &str,
    dashboard: &Dashboard,
    initial: &Selection,
) -> ServerMessage {
    ServerMessage::Connected {
        session_id: session_id.to_string(),
        view: Box::new(dashboard.render(initial)),
    }
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, hub: Arc<SessionHub>, dashboard: Arc<Dashboard>) {
    let (mut sender, mut receiver) = socket.split();

    // Create channel for sending messages to this session
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let initial = dashboard.initial_selection();

    // Register with hub
    let session_id = match hub.register(tx, initial.clone()).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register session");
            // Send error message before closing
            let error_msg = ServerMessage::Error {
                message: e.to_string(),
            };
            if let Some(text) = encode(&error_msg) {
                let _ = sender.send(Message::Text(text)).await;
            }
            return;
        }
    };

    // Send the initial full view
    let connected_msg = connected_message(&session_id, &dashboard, &initial);
    let sent = match encode(&connected_msg) {
        Some(text) => sender.send(Message::Text(text)).await.is_ok(),
        None => false,
    };
    if !sent {
        tracing::error!(session_id = %session_id, "Failed to send connected message");
        hub.unregister(&session_id).await;
        return;
    }

    let session_for_send = session_id.clone();

    // Task to forward messages from channel to WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Some(text) = encode(&msg) {
                if sender.send(Message::Text(text)).await.is_err() {
                    tracing::debug!(
                        session_id = %session_for_send,
                        "WebSocket send failed, closing session"
                    );
                    break;
                }
            }
        }
    });

    let hub_for_recv = Arc::clone(&hub);
    let session_for_recv = session_id.clone();

    // Task to receive messages from WebSocket and handle them
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&hub_for_recv, &dashboard, &session_for_recv, msg).await
                    {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = %session_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    // Cleanup: unregister from hub
    hub.unregister(&session_id).await;
}

/// Handle a received WebSocket message
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(
    hub: &Arc<SessionHub>,
    dashboard: &Dashboard,
    session_id: &str,
    message: Message,
) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    handle_client_message(hub, dashboard, session_id, client_msg).await;
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = %session_id,
                        error = %e,
                        text = %text,
                        "Invalid client message"
                    );
                    // Keep the session open
                    let error_msg = ServerMessage::Error {
                        message: describe_invalid(&text, &e),
                    };
                    let _ = hub.send_to(session_id, error_msg).await;
                }
            }
            true
        }
        Message::Binary(_) => {
            let error_msg = ServerMessage::Error {
                message: "Binary messages not supported".to_string(),
            };
            let _ = hub.send_to(session_id, error_msg).await;
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(session_id = %session_id, "Client requested close");
            false
        }
    }
}

/// Error text for a message that failed to parse
///
/// An event whose only fault is its month reports the invalid month.
fn describe_invalid(text: &str, error: &serde_json::Error) -> String {
    let event = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|value| value.get("event").cloned());

    match event.map(SelectionEvent::from_json) {
        Some(Err(e @ DashboardError::InvalidMonth(_))) => e.to_string(),
        _ => format!("Invalid message format: {}", error),
    }
}

/// Handle a parsed client message
async fn handle_client_message(
    hub: &Arc<SessionHub>,
    dashboard: &Dashboard,
    session_id: &str,
    message: ClientMessage,
) {
    let response = match message {
        ClientMessage::Event { event } => match hub.apply(session_id, event).await {
            Ok(transition) => ServerMessage::Update(dashboard.render_transition(&transition)),
            Err(e) => ServerMessage::Error {
                message: e.to_string(),
            },
        },
        ClientMessage::Reset => match hub.reset(session_id, dashboard.initial_selection()).await {
            // A reset redraws every output, not just the changed ones
            Ok(transition) => ServerMessage::Update(DispatchResult {
                outputs: dashboard.render_outputs(&transition.selection, &OutputId::ALL),
                selection: transition.selection,
                changed_inputs: transition.changed_inputs,
                clear_overlay: transition.clear_overlay,
            }),
            Err(e) => ServerMessage::Error {
                message: e.to_string(),
            },
        },
        ClientMessage::Ping => ServerMessage::Pong,
    };

    if let Err(e) = hub.send_to(session_id, response).await {
        tracing::debug!(session_id = %session_id, error = %e, "Failed to queue response");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{MapSettings, OutputValue};
    use crate::dataset::{default_locations, Dataset, Month, StateMonthAggregate};
    use crate::websocket::HubConfig;

    fn dashboard() -> Dashboard {
        let dataset = Dataset::new(
            Vec::new(),
            vec![StateMonthAggregate::new("Washington", Month::Aug, 12)],
            default_locations(),
        )
        .unwrap();
        Dashboard::new(Arc::new(dataset), MapSettings::default())
    }

    #[tokio::test]
    async fn test_event_message_produces_update() {
        let dashboard = dashboard();
        let hub = Arc::new(SessionHub::new(HubConfig::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub
            .register(tx, dashboard.initial_selection())
            .await
            .unwrap();

        let text = r#"{"type": "event", "event": {"type": "bar_clicked", "month": "Aug"}}"#;
        assert!(handle_ws_message(&hub, &dashboard, &id, Message::Text(text.to_string())).await);

        match rx.try_recv().unwrap() {
            ServerMessage::Update(result) => {
                assert_eq!(result.selection, Selection::new("Washington", Some(Month::Aug)));
                assert!(result.clear_overlay);
                assert!(result.outputs.contains(&OutputValue::SelectionTotal(
                    "Total Pings in Selection: 12".to_string()
                )));
            }
            other => panic!("Expected Update, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_message_keeps_session_open() {
        let dashboard = dashboard();
        let hub = Arc::new(SessionHub::new(HubConfig::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub
            .register(tx, dashboard.initial_selection())
            .await
            .unwrap();

        let text = r#"{"type": "event", "event": {"type": "set_month", "month": "Smarch"}}"#;
        assert!(handle_ws_message(&hub, &dashboard, &id, Message::Text(text.to_string())).await);
        match rx.try_recv().unwrap() {
            ServerMessage::Error { message } => {
                assert!(message.starts_with("Invalid month 'Smarch'"), "{}", message);
            }
            other => panic!("Expected Error, got {:?}", other),
        }
        assert_eq!(hub.selection(&id).await.unwrap().month, None);

        let text = r#"{"type": "dance"}"#;
        assert!(handle_ws_message(&hub, &dashboard, &id, Message::Text(text.to_string())).await);
        match rx.try_recv().unwrap() {
            ServerMessage::Error { message } => {
                assert!(message.starts_with("Invalid message format"), "{}", message);
            }
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reset_redraws_everything() {
        let dashboard = dashboard();
        let hub = Arc::new(SessionHub::new(HubConfig::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub
            .register(tx, dashboard.initial_selection())
            .await
            .unwrap();

        hub.apply(&id, SelectionEvent::BarClicked { month: Month::Jan })
            .await
            .unwrap();
        handle_client_message(&hub, &dashboard, &id, ClientMessage::Reset).await;

        match rx.try_recv().unwrap() {
            ServerMessage::Update(result) => {
                assert_eq!(result.selection, dashboard.initial_selection());
                assert_eq!(result.changed_inputs, vec![crate::dashboard::InputId::Month]);
                assert!(result.clear_overlay);
                let ids: Vec<OutputId> = result.outputs.iter().map(OutputValue::id).collect();
                assert_eq!(ids, OutputId::ALL.to_vec());
            }
            other => panic!("Expected Update, got {:?}", other),
        }
    }

    #[test]
    fn test_connected_message_carries_initial_view() {
        let dashboard = dashboard();
        let msg = connected_message("session-1", &dashboard, &dashboard.initial_selection());

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "connected");
        assert_eq!(json["session_id"], "session-1");
        assert_eq!(json["view"]["selection"]["state"], "Washington");
        assert_eq!(json["view"]["selection"]["month"], serde_json::Value::Null);
        assert_eq!(json["view"]["bar_chart"]["bars"].as_array().unwrap().len(), 12);
        assert_eq!(
            json["view"]["summary"]["month_label"],
            "in the month: none selected"
        );
    }

    #[tokio::test]
    async fn test_close_ends_session_loop() {
        let dashboard = dashboard();
        let hub = Arc::new(SessionHub::new(HubConfig::default()));
        assert!(!handle_ws_message(&hub, &dashboard, "any", Message::Close(None)).await);
    }
}
