//! WebSocket wire messages
//!
//! Defines the JSON exchanged on `/ws/chat/{session_id}`:
//! - Server → Client: [`ServerEvent`], tagged by `type`, always timestamped
//! - Client → Server: [`ClientMessage`]

use crate::error::{ChatError, ErrorCode};
use crate::types::ToolCallRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Server → Client events (JSON)
// =============================================================================

/// Event pushed to the client during a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Echo of the user's message, sent first
    UserMessage {
        content: String,
        timestamp: DateTime<Utc>,
    },
    /// The agent requested a tool; record is pending
    ToolCallStart {
        tool_call: ToolCallRecord,
        timestamp: DateTime<Utc>,
    },
    /// A tool finished; record carries status and result
    ToolCallResult {
        tool_call: ToolCallRecord,
        timestamp: DateTime<Utc>,
    },
    /// Incremental fragment of the assistant's reply
    TokenStream {
        content: String,
        timestamp: DateTime<Utc>,
    },
    /// Full reply text and every tool call of the turn
    AssistantResponse {
        content: String,
        tool_calls: Vec<ToolCallRecord>,
        timestamp: DateTime<Utc>,
    },
    /// Terminal marker of a turn
    ResponseComplete { timestamp: DateTime<Utc> },
    Error {
        code: ErrorCode,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl ServerEvent {
    pub fn user_message(content: impl Into<String>) -> Self {
        Self::UserMessage {
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn tool_call_start(tool_call: ToolCallRecord) -> Self {
        Self::ToolCallStart {
            tool_call,
            timestamp: Utc::now(),
        }
    }

    pub fn tool_call_result(tool_call: ToolCallRecord) -> Self {
        Self::ToolCallResult {
            tool_call,
            timestamp: Utc::now(),
        }
    }

    pub fn token(content: impl Into<String>) -> Self {
        Self::TokenStream {
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant_response(content: impl Into<String>, tool_calls: Vec<ToolCallRecord>) -> Self {
        Self::AssistantResponse {
            content: content.into(),
            tool_calls,
            timestamp: Utc::now(),
        }
    }

    pub fn response_complete() -> Self {
        Self::ResponseComplete {
            timestamp: Utc::now(),
        }
    }

    pub fn error(err: &ChatError) -> Self {
        Self::Error {
            code: err.code(),
            message: err.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Wire `type` tag of this event
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserMessage { .. } => "user_message",
            Self::ToolCallStart { .. } => "tool_call_start",
            Self::ToolCallResult { .. } => "tool_call_result",
            Self::TokenStream { .. } => "token_stream",
            Self::AssistantResponse { .. } => "assistant_response",
            Self::ResponseComplete { .. } => "response_complete",
            Self::Error { .. } => "error",
        }
    }
}

// =============================================================================
// Client → Server messages (JSON)
// =============================================================================

/// Inbound chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMessage {
    pub message: String,
}

impl ClientMessage {
    /// Parse an inbound text frame
    pub fn parse(text: &str) -> Result<Self, ChatError> {
        serde_json::from_str(text).map_err(|e| ChatError::InvalidRequest(e.to_string()))
    }
}
