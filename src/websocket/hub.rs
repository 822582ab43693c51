//! Live Session Hub
//!
//! Tracks every connected dashboard page together with its selection. Each
//! session is only ever written by its own socket task, so events for one
//! session are applied in order.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::ServerMessage;
use crate::dashboard::{Selection, SelectionEvent, SelectionManager, Transition};

/// Unique identifier for a live session
pub type SessionId = String;

/// Manages all live sessions
pub struct SessionHub {
    /// Active sessions: SessionId → SessionHandle
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
    /// Configuration
    config: HubConfig,
}

/// Configuration for the session hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent sessions
    pub max_sessions: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self { max_sessions: 1000 }
    }
}

/// Per-session state
pub struct SessionHandle {
    /// Channel sender for this session's socket
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// The session's selection
    pub selection: SelectionManager,
}

impl SessionHub {
    /// Create a new session hub
    pub fn new(config: HubConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Register a new session starting at `initial`
    ///
    /// Returns the session ID on success, or an error if the session limit
    /// has been reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
        initial: Selection,
    ) -> Result<SessionId, HubError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.config.max_sessions {
            return Err(HubError::TooManySessions(self.config.max_sessions));
        }

        let id = Uuid::new_v4().to_string();
        sessions.insert(
            id.clone(),
            SessionHandle {
                sender,
                selection: SelectionManager::new(initial),
            },
        );

        tracing::info!(session_id = %id, "Session connected");
        Ok(id)
    }

    /// Unregister a session
    pub async fn unregister(&self, id: &str) {
        if self.sessions.write().await.remove(id).is_some() {
            tracing::info!(session_id = %id, "Session disconnected");
        }
    }

    /// Apply an event to a session's selection
    pub async fn apply(&self, id: &str, event: SelectionEvent) -> Result<Transition, HubError> {
        let mut sessions = self.sessions.write().await;
        let handle = sessions.get_mut(id).ok_or(HubError::SessionNotFound)?;

        let transition = handle.selection.apply(event);

        tracing::debug!(
            session_id = %id,
            state = %transition.selection.state,
            month = ?transition.selection.month,
            changed = ?transition.changed_inputs,
            "Session selection updated"
        );

        Ok(transition)
    }

    /// Replace a session's selection
    pub async fn reset(&self, id: &str, selection: Selection) -> Result<Transition, HubError> {
        let mut sessions = self.sessions.write().await;
        let handle = sessions.get_mut(id).ok_or(HubError::SessionNotFound)?;
        Ok(handle.selection.reset(selection))
    }

    /// Current selection of a session
    pub async fn selection(&self, id: &str) -> Result<Selection, HubError> {
        let sessions = self.sessions.read().await;
        let handle = sessions.get(id).ok_or(HubError::SessionNotFound)?;
        Ok(handle.selection.current().clone())
    }

    /// Send a message directly to a specific session
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let sessions = self.sessions.read().await;
        let handle = sessions.get(id).ok_or(HubError::SessionNotFound)?;

        handle
            .sender
            .send(message)
            .map_err(|_| HubError::SendFailed)
    }

    /// Get the current session count
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Errors that can occur in the session hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many sessions (limit: {0})")]
    TooManySessions(usize),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Failed to send message")]
    SendFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Month;

    fn initial() -> Selection {
        Selection::new("Washington", None)
    }

    #[test]
    fn test_default_config() {
        assert_eq!(HubConfig::default().max_sessions, 1000);
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = SessionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register(tx, initial()).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(hub.session_count().await, 1);
        assert_eq!(hub.selection(&id).await.unwrap(), initial());

        hub.unregister(&id).await;
        assert_eq!(hub.session_count().await, 0);
        assert!(matches!(
            hub.selection(&id).await,
            Err(HubError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let hub = SessionHub::new(HubConfig::default());
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        let id1 = hub.register(tx1, initial()).await.unwrap();
        let id2 = hub.register(tx2, initial()).await.unwrap();

        hub.apply(&id1, SelectionEvent::BarClicked { month: Month::Aug })
            .await
            .unwrap();

        assert_eq!(hub.selection(&id1).await.unwrap().month, Some(Month::Aug));
        assert_eq!(hub.selection(&id2).await.unwrap().month, None);
    }

    #[tokio::test]
    async fn test_reset() {
        let hub = SessionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = hub.register(tx, initial()).await.unwrap();

        hub.apply(
            &id,
            SelectionEvent::SetState {
                state: "Oregon".to_string(),
            },
        )
        .await
        .unwrap();

        let transition = hub.reset(&id, initial()).await.unwrap();
        assert!(transition.clear_overlay);
        assert_eq!(hub.selection(&id).await.unwrap(), initial());
    }

    #[tokio::test]
    async fn test_session_limit() {
        let hub = SessionHub::new(HubConfig { max_sessions: 2 });

        let (tx1, _) = mpsc::unbounded_channel();
        let (tx2, _) = mpsc::unbounded_channel();
        let (tx3, _) = mpsc::unbounded_channel();

        hub.register(tx1, initial()).await.unwrap();
        hub.register(tx2, initial()).await.unwrap();
        let result = hub.register(tx3, initial()).await;

        assert!(matches!(result, Err(HubError::TooManySessions(2))));
    }

    #[tokio::test]
    async fn test_send_to() {
        let hub = SessionHub::new(HubConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register(tx, initial()).await.unwrap();

        hub.send_to(&id, ServerMessage::Pong).await.unwrap();
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Pong)));

        assert!(matches!(
            hub.send_to("missing", ServerMessage::Pong).await,
            Err(HubError::SessionNotFound)
        ));
    }
}
