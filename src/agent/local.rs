//! Local rule-based agent backend
//!
//! Runs entirely in-process. Each tool in the definition is offered the
//! user's message; tools that recognize it are invoked, and the reply is
//! composed from their results. Lets the gateway run and be tested without
//! an external agent framework.

use crate::agent::definition::AgentDefinition;
use crate::agent::{AgentEvent, AgentEventStream, AgentRunner, RunnerFactory};
use crate::error::{ChatError, Result};
use crate::types::Role;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One entry of a runner's conversation history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Execution context initialized when the runner is created
#[derive(Debug, Clone)]
pub struct ExecutionSession {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

/// Per-session runner over an [`AgentDefinition`]
pub struct LocalRunner {
    definition: Arc<AgentDefinition>,
    execution: ExecutionSession,
    history: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl LocalRunner {
    pub fn execution(&self) -> &ExecutionSession {
        &self.execution
    }

    /// Snapshot of the conversation seen by this runner
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().await.clone()
    }
}

#[async_trait]
impl AgentRunner for LocalRunner {
    fn session_id(&self) -> &str {
        &self.execution.session_id
    }

    async fn run(&self, message: &str) -> Result<AgentEventStream> {
        let definition = self.definition.clone();
        let history = self.history.clone();
        let message = message.to_string();
        let session_id = self.execution.session_id.clone();

        history.lock().await.push(HistoryEntry {
            role: Role::User,
            content: message.clone(),
        });

        let stream = async_stream::stream! {
            let mut outcomes = Vec::new();

            for tool in definition.tools() {
                let Some(arguments) = tool.match_message(&message) else {
                    continue;
                };
                let call_id = uuid::Uuid::new_v4().to_string();
                tracing::debug!(
                    session_id = %session_id,
                    tool = %tool.name(),
                    "Local runner invoking tool"
                );

                yield Ok::<_, ChatError>(AgentEvent::ToolCallRequest {
                    id: Some(call_id.clone()),
                    name: tool.name().to_string(),
                    arguments: arguments.clone(),
                });

                let (response, is_error) = match tool.call(&arguments).await {
                    Ok(value) => (value, false),
                    Err(e) => (serde_json::json!({ "error": e.to_string() }), true),
                };
                outcomes.push((tool.name().to_string(), response.clone(), is_error));

                yield Ok(AgentEvent::ToolCallResponse {
                    id: Some(call_id),
                    name: tool.name().to_string(),
                    response,
                    is_error,
                });
            }

            let reply = compose_reply(&definition, &outcomes);
            history.lock().await.push(HistoryEntry {
                role: Role::Assistant,
                content: reply.clone(),
            });

            yield Ok(AgentEvent::text(reply));
        };

        Ok(Box::pin(stream))
    }
}

fn compose_reply(definition: &AgentDefinition, outcomes: &[(String, Value, bool)]) -> String {
    if outcomes.is_empty() {
        let mut reply = format!("Hi, I'm {}.", definition.name);
        if !definition.description.is_empty() {
            reply.push(' ');
            reply.push_str(&definition.description);
        }
        let tools = definition.tool_names();
        if !tools.is_empty() {
            reply.push_str(&format!(" I can use: {}.", tools.join(", ")));
        }
        return reply;
    }

    outcomes
        .iter()
        .map(|(name, value, is_error)| {
            if *is_error {
                let reason = value.get("error").and_then(Value::as_str).unwrap_or("unknown error");
                format!("{} failed: {}.", name, reason)
            } else {
                format!("{} returned {}.", name, value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds [`LocalRunner`]s for one agent definition
pub struct LocalRunnerFactory {
    definition: Arc<AgentDefinition>,
    app_name: String,
}

impl LocalRunnerFactory {
    pub fn new(definition: AgentDefinition, app_name: impl Into<String>) -> Self {
        Self {
            definition: Arc::new(definition),
            app_name: app_name.into(),
        }
    }

    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }
}

#[async_trait]
impl RunnerFactory for LocalRunnerFactory {
    async fn create(&self, session_id: &str) -> Result<Arc<dyn AgentRunner>> {
        // The chat session id doubles as the execution user id.
        let execution = ExecutionSession {
            app_name: self.app_name.clone(),
            user_id: session_id.to_string(),
            session_id: session_id.to_string(),
            created_at: Utc::now(),
        };

        tracing::info!(
            session_id = %session_id,
            app_name = %self.app_name,
            agent = %self.definition.name,
            "Local runner created"
        );

        Ok(Arc::new(LocalRunner {
            definition: self.definition.clone(),
            execution,
            history: Arc::new(Mutex::new(Vec::new())),
        }))
    }

    fn name(&self) -> &str {
        "local"
    }
}
