//! WebSocket chat handler
//!
//! One task per connection. Inbound frames are handled strictly in order:
//! a turn runs to completion before the next frame is read.

use crate::api::AppState;
use crate::engine::ChatEngine;
use crate::error::{ChatError, Result};
use crate::gateway::events::{ClientMessage, ServerEvent};
use crate::gateway::turn::EventSink;
use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use std::fmt;
use std::sync::Arc;

/// Lifecycle of a chat connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for the next inbound message
    Idle,
    /// A turn is streaming
    Processing,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Processing => write!(f, "processing"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

#[async_trait]
impl EventSink for WebSocket {
    async fn emit(&mut self, event: &ServerEvent) -> Result<()> {
        let json = serde_json::to_string(event)?;
        self.send(Message::Text(json))
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))
    }
}

/// GET /ws/chat/:session_id
pub async fn ws_chat_upgrade(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_chat_ws(socket, session_id, state.engine))
}

/// Drive one chat connection until the client goes away
pub async fn handle_chat_ws(mut socket: WebSocket, session_id: String, engine: Arc<ChatEngine>) {
    let mut state = ConnectionState::Idle;
    tracing::info!(session_id = %session_id, state = %state, "Chat connection opened");

    let mut turns = 0usize;

    while let Some(frame) = socket.recv().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            // Binary frames are ignored; ping/pong is answered by axum
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "WebSocket receive failed");
                break;
            }
        };

        let inbound = match ClientMessage::parse(&text) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Rejected inbound frame");
                if socket.emit(&ServerEvent::error(&e)).await.is_err() {
                    break;
                }
                continue;
            }
        };

        state = ConnectionState::Processing;
        tracing::debug!(session_id = %session_id, state = %state, "Turn started");

        if let Err(e) = engine.run_turn(&session_id, &inbound.message, &mut socket).await {
            tracing::info!(session_id = %session_id, error = %e, "Client disconnected mid-turn");
            break;
        }

        turns += 1;
        state = ConnectionState::Idle;
        tracing::debug!(session_id = %session_id, state = %state, "Turn finished");
    }

    state = ConnectionState::Closed;
    tracing::info!(
        session_id = %session_id,
        state = %state,
        turns,
        "Chat connection closed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Idle.to_string(), "idle");
        assert_eq!(ConnectionState::Processing.to_string(), "processing");
        assert_eq!(ConnectionState::Closed.to_string(), "closed");
    }
}
