//! Core chat types: sessions, messages and tool-call records
//!
//! All types use snake_case JSON for wire compatibility with the browser
//! client. Timestamps are UTC and serialize as RFC 3339.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chat session with its full message history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque unique identifier
    pub id: String,

    /// Display title
    pub title: String,

    pub created_at: DateTime<Utc>,

    /// Updated on every appended message
    pub last_message_at: DateTime<Utc>,

    /// Messages in arrival order
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Session {
    /// Create an empty session
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            created_at: now,
            last_message_at: now,
            messages: Vec::new(),
        }
    }

    /// Metadata-only view of this session
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            last_message_at: self.last_message_at,
        }
    }

    /// Append a message and bump `last_message_at`
    pub fn push(&mut self, message: Message) {
        self.last_message_at = message.timestamp;
        self.messages.push(message);
    }
}

/// Session metadata without message bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
}

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a session's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
}

impl Message {
    /// Create a message with a fresh id and the current time
    pub fn new(role: Role, content: impl Into<String>, tool_calls: Vec<ToolCallRecord>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            tool_calls,
        }
    }
}

/// Lifecycle of a tool invocation within one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    Pending,
    Success,
    Error,
}

/// A tool invocation requested by the agent during a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Gateway-allocated record id
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub arguments: Map<String, Value>,

    pub status: ToolCallStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Call id supplied by the agent adapter, used to match the response
    #[serde(skip)]
    pub call_id: Option<String>,
}

impl ToolCallRecord {
    /// Create a pending record with a fresh id
    pub fn pending(
        name: impl Into<String>,
        arguments: Map<String, Value>,
        call_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            arguments,
            status: ToolCallStatus::Pending,
            result: None,
            call_id,
        }
    }

    /// Record the outcome of the invocation
    pub fn resolve(&mut self, result: Value, is_error: bool) {
        self.status = if is_error {
            ToolCallStatus::Error
        } else {
            ToolCallStatus::Success
        };
        self.result = Some(result);
    }

    pub fn is_pending(&self) -> bool {
        self.status == ToolCallStatus::Pending
    }
}
