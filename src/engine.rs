//! Chat engine: sessions, runners and turn execution
//!
//! `ChatEngine` is the single entry point shared by the REST handlers and the
//! WebSocket gateway. It owns the [`SessionStore`] and the [`RunnerPool`] and
//! serializes turns per session.

use crate::agent::RunnerFactory;
use crate::error::Result;
use crate::gateway::events::ServerEvent;
use crate::gateway::pacing::StreamPacing;
use crate::gateway::turn::{stream_turn, EventSink, TurnState};
use crate::pool::RunnerPool;
use crate::store::SessionStore;
use crate::types::{Message, Role, SessionSummary};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default title for sessions created without one
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Session-multiplexed chat engine
pub struct ChatEngine {
    store: SessionStore,
    pool: RunnerPool,
    /// Per-session turn locks; an entry outlives its session while a turn holds it
    turn_locks: DashMap<String, Arc<Mutex<()>>>,
    pacing: StreamPacing,
    default_title: String,
}

impl ChatEngine {
    pub fn new(factory: Arc<dyn RunnerFactory>) -> Self {
        Self {
            store: SessionStore::new(),
            pool: RunnerPool::new(factory),
            turn_locks: DashMap::new(),
            pacing: StreamPacing::default(),
            default_title: DEFAULT_SESSION_TITLE.to_string(),
        }
    }

    pub fn with_pacing(mut self, pacing: StreamPacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn pool(&self) -> &RunnerPool {
        &self.pool
    }

    pub fn pacing(&self) -> &StreamPacing {
        &self.pacing
    }

    pub fn default_title(&self) -> &str {
        &self.default_title
    }

    // =========================================================================
    // Session management
    // =========================================================================

    /// Create a session; blank titles fall back to the default
    pub async fn create_session(&self, title: Option<&str>) -> String {
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => self.default_title.as_str(),
        };
        self.store.create(title).await
    }

    /// Make sure a session exists under `session_id`
    ///
    /// Returns `true` if it had to be created.
    pub async fn ensure_session(&self, session_id: &str) -> bool {
        if self.store.contains(session_id).await {
            return false;
        }
        self.store
            .create_with_id(session_id, &self.default_title)
            .await
    }

    /// All sessions, most recently active first
    pub async fn list_sessions(&self) -> Vec<SessionSummary> {
        let mut sessions = self.store.list().await;
        sessions.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        sessions
    }

    pub async fn messages(&self, session_id: &str) -> Option<Vec<Message>> {
        self.store.messages(session_id).await
    }

    /// Remove a session and its runner
    ///
    /// Idempotent; returns whether the session existed. The turn lock is only
    /// dropped when no turn holds or awaits it, so a turn started after the
    /// delete still waits for one already in flight.
    pub async fn delete_session(&self, session_id: &str) -> bool {
        let existed = self.store.delete(session_id).await;
        self.pool.remove(session_id).await;
        self.turn_locks
            .remove_if(session_id, |_, lock| Arc::strong_count(lock) == 1);
        existed
    }

    // =========================================================================
    // Turn execution
    // =========================================================================

    fn turn_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.turn_locks
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    /// Run one conversational turn, emitting client events to `sink`
    ///
    /// Event order: `user_message`, any tool and token events, then
    /// `assistant_response` (only when the reply has text) and finally
    /// `response_complete`. An agent failure is reported as an `error` event
    /// followed by `response_complete`; its partial reply is discarded.
    /// Only transport errors are returned, meaning the client is gone.
    pub async fn run_turn(
        &self,
        session_id: &str,
        message: &str,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let lock = self.turn_lock(session_id);
        let _guard = lock.lock().await;

        if self.ensure_session(session_id).await {
            tracing::info!(session_id = %session_id, "Session created by incoming message");
        }

        sink.emit(&ServerEvent::user_message(message)).await?;
        self.store
            .append_message(session_id, Role::User, message, None)
            .await;

        let state = match self.stream_reply(session_id, message, sink).await {
            Ok(state) => state,
            Err(e) if e.is_disconnect() => return Err(e),
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Turn failed");
                sink.emit(&ServerEvent::error(&e)).await?;
                sink.emit(&ServerEvent::response_complete()).await?;
                return Ok(());
            }
        };

        let (text, tool_calls) = state.into_parts();
        if !text.is_empty() {
            sink.emit(&ServerEvent::assistant_response(&text, tool_calls.clone()))
                .await?;
            self.store
                .append_message(session_id, Role::Assistant, &text, Some(tool_calls))
                .await;
        }
        sink.emit(&ServerEvent::response_complete()).await?;

        tracing::debug!(session_id = %session_id, reply_len = text.len(), "Turn complete");
        Ok(())
    }

    async fn stream_reply(
        &self,
        session_id: &str,
        message: &str,
        sink: &mut dyn EventSink,
    ) -> Result<TurnState> {
        let runner = self.pool.get_or_create(session_id).await?;
        let stream = runner.run(message).await?;
        stream_turn(session_id, stream, sink, &self.pacing).await
    }
}
