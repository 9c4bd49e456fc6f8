//! Error types for a3s-chat

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in the chat gateway
#[derive(Debug, Error)]
pub enum ChatError {
    /// Unknown session id
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The agent runner failed to start or failed mid-stream
    #[error("Agent error: {0}")]
    Agent(String),

    /// A tool invoked by the agent failed
    #[error("Tool '{name}' failed: {reason}")]
    Tool { name: String, reason: String },

    /// Malformed inbound payload
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// WebSocket send/receive failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChatError {
    /// Wire-level code reported to clients in `error` events
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Agent(_) => ErrorCode::AgentError,
            Self::Tool { .. } => ErrorCode::ToolError,
            Self::InvalidRequest(_) | Self::Serialization(_) => ErrorCode::InvalidRequest,
            Self::Transport(_) => ErrorCode::TransportError,
            Self::Config(_) | Self::Io(_) => ErrorCode::InternalError,
        }
    }

    /// Whether this error means the client connection is gone
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Normalized error codes carried on `error` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    AgentError,
    ToolError,
    InvalidRequest,
    TransportError,
    InternalError,
}

/// Result type alias for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;
