//! In-memory session registry
//!
//! `SessionStore` owns every chat session and its message history for the
//! lifetime of the process. Nothing is persisted across restarts.

use crate::types::{Message, Role, Session, SessionSummary, ToolCallRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory registry of chat sessions
///
/// Thread-safe via an internal lock; cheap to clone.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with a freshly allocated id
    pub async fn create(&self, title: &str) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        let session = Session::new(session_id.clone(), title);
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), session);

        tracing::info!(session_id = %session_id, title = %title, "Session created");
        session_id
    }

    /// Create a session under a caller-chosen id
    ///
    /// Returns `false` without touching anything if the id is already taken.
    pub async fn create_with_id(&self, session_id: &str, title: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(session_id) {
            return false;
        }
        sessions.insert(session_id.to_string(), Session::new(session_id, title));

        tracing::info!(session_id = %session_id, title = %title, "Session created on first contact");
        true
    }

    /// Get a snapshot of a session, including its messages
    pub async fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Get a snapshot of a session's messages
    pub async fn messages(&self, session_id: &str) -> Option<Vec<Message>> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|s| s.messages.clone())
    }

    /// Append a message to a session's history
    ///
    /// Unknown session ids are ignored. Returns the appended message, if any.
    pub async fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        tool_calls: Option<Vec<ToolCallRecord>>,
    ) -> Option<Message> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(session_id) else {
            tracing::debug!(session_id = %session_id, "Dropping message for unknown session");
            return None;
        };

        let message = Message::new(role, content, tool_calls.unwrap_or_default());
        session.push(message.clone());
        Some(message)
    }

    /// Metadata for every session, in no particular order
    pub async fn list(&self) -> Vec<SessionSummary> {
        self.sessions
            .read()
            .await
            .values()
            .map(Session::summary)
            .collect()
    }

    /// Remove a session; returns whether it existed
    pub async fn delete(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id).is_some();
        if removed {
            tracing::info!(session_id = %session_id, "Session deleted");
        }
        removed
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
