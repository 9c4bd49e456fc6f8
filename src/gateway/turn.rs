//! Turn processing: agent events in, client events out
//!
//! Consumes one turn's [`AgentEventStream`] and translates each agent event
//! into client events, tracking tool-call records and accumulating the reply
//! text as it goes.

use crate::agent::{AgentEvent, AgentEventStream};
use crate::error::{ChatError, Result};
use crate::gateway::events::ServerEvent;
use crate::gateway::pacing::StreamPacing;
use crate::types::ToolCallRecord;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{Map, Value};

/// Destination for client events
#[async_trait]
pub trait EventSink: Send {
    /// Deliver one event; a `Transport` error means the client is gone
    async fn emit(&mut self, event: &ServerEvent) -> Result<()>;
}

/// Collects events in memory
#[async_trait]
impl EventSink for Vec<ServerEvent> {
    async fn emit(&mut self, event: &ServerEvent) -> Result<()> {
        self.push(event.clone());
        Ok(())
    }
}

#[async_trait]
impl EventSink for tokio::sync::mpsc::UnboundedSender<ServerEvent> {
    async fn emit(&mut self, event: &ServerEvent) -> Result<()> {
        self.send(event.clone())
            .map_err(|_| ChatError::Transport("event receiver dropped".to_string()))
    }
}

/// Accumulated state of an in-flight turn
#[derive(Debug, Default)]
pub struct TurnState {
    tool_calls: Vec<ToolCallRecord>,
    text: String,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tool request; returns the new pending record
    pub fn start_tool_call(
        &mut self,
        call_id: Option<String>,
        name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> ToolCallRecord {
        let record = ToolCallRecord::pending(name, arguments, call_id);
        self.tool_calls.push(record.clone());
        record
    }

    /// Resolve the pending record a tool response belongs to
    ///
    /// Matches by adapter call id first, then falls back to the most recent
    /// pending record with the same tool name. Returns `None` when nothing
    /// matches.
    pub fn finish_tool_call(
        &mut self,
        call_id: Option<&str>,
        name: &str,
        response: Value,
        is_error: bool,
    ) -> Option<ToolCallRecord> {
        let by_id = call_id.and_then(|id| {
            self.tool_calls
                .iter()
                .position(|r| r.is_pending() && r.call_id.as_deref() == Some(id))
        });
        let index = by_id.or_else(|| {
            self.tool_calls
                .iter()
                .rposition(|r| r.is_pending() && r.name == name)
        })?;

        let record = &mut self.tool_calls[index];
        record.resolve(response, is_error);
        Some(record.clone())
    }

    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tool_calls(&self) -> &[ToolCallRecord] {
        &self.tool_calls
    }

    pub fn into_parts(self) -> (String, Vec<ToolCallRecord>) {
        (self.text, self.tool_calls)
    }
}

/// Drain `stream`, forwarding translated events to `sink`
///
/// Returns the accumulated turn state once the stream is exhausted. The
/// first agent or transport error aborts the turn.
pub async fn stream_turn(
    session_id: &str,
    mut stream: AgentEventStream,
    sink: &mut dyn EventSink,
    pacing: &StreamPacing,
) -> Result<TurnState> {
    let mut state = TurnState::new();

    while let Some(event) = stream.next().await {
        match event? {
            AgentEvent::ToolCallRequest {
                id,
                name,
                arguments,
            } => {
                let record = state.start_tool_call(id, name, arguments);
                tracing::debug!(
                    session_id = %session_id,
                    tool = %record.name,
                    record_id = %record.id,
                    "Tool call started"
                );
                sink.emit(&ServerEvent::tool_call_start(record)).await?;
            }
            AgentEvent::ToolCallResponse {
                id,
                name,
                response,
                is_error,
            } => match state.finish_tool_call(id.as_deref(), &name, response, is_error) {
                Some(record) => {
                    sink.emit(&ServerEvent::tool_call_result(record)).await?;
                }
                None => {
                    tracing::warn!(
                        session_id = %session_id,
                        tool = %name,
                        "Tool response matches no pending call, ignoring"
                    );
                }
            },
            AgentEvent::Text { text } => {
                for chunk in pacing.chunks(&text) {
                    sink.emit(&ServerEvent::token(chunk)).await?;
                    pacing.pause().await;
                }
                state.push_text(&text);
            }
        }
    }

    Ok(state)
}
