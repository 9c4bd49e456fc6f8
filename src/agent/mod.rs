//! Agent adapter: the seam between the gateway and an agent framework
//!
//! The gateway never talks to a model directly. It asks a [`RunnerFactory`]
//! for one [`AgentRunner`] per session and consumes the runner's output as a
//! stream of [`AgentEvent`]s.
//!
//! ```text
//! gateway -> RunnerPool -> RunnerFactory::create(session_id) -> AgentRunner
//!                                                                  └── run(message) -> Stream<AgentEvent>
//! ```
//!
//! ## Backends
//!
//! - **local**: rule-based runner over an [`AgentDefinition`] and its tools,
//!   for running the gateway without an external framework

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub mod definition;
pub mod local;
pub mod tools;

pub use definition::{AgentDefinition, Tool};
pub use local::{LocalRunner, LocalRunnerFactory};
pub use tools::CalculateSquare;

/// A unit emitted by an agent while it works on one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Fragment of the assistant's reply
    Text { text: String },

    /// The agent wants a tool invoked
    ToolCallRequest {
        /// Framework call id, when the framework provides one
        #[serde(default)]
        id: Option<String>,
        name: String,
        #[serde(default)]
        arguments: Map<String, Value>,
    },

    /// A previously requested tool invocation finished
    ToolCallResponse {
        #[serde(default)]
        id: Option<String>,
        name: String,
        response: Value,
        #[serde(default)]
        is_error: bool,
    },
}

impl AgentEvent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Event stream produced by a single turn
pub type AgentEventStream = BoxStream<'static, Result<AgentEvent>>;

/// Stateful per-session execution handle
///
/// A runner keeps whatever conversation state the backend needs between
/// turns. It is owned by exactly one session and never shared.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Session this runner is bound to
    fn session_id(&self) -> &str;

    /// Start a turn for `message`, returning the agent's event stream
    async fn run(&self, message: &str) -> Result<AgentEventStream>;

    /// Release backend resources
    ///
    /// Called when the owning session is deleted. Default does nothing.
    async fn shutdown(&self) {}
}

/// Constructs runners bound to a fixed agent definition
#[async_trait]
pub trait RunnerFactory: Send + Sync {
    /// Build and initialize a runner for `session_id`
    async fn create(&self, session_id: &str) -> Result<Arc<dyn AgentRunner>>;

    /// Backend name (e.g., "local")
    fn name(&self) -> &str;
}
