//! Declarative agent definition and the tool trait

use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A callable exposed to the agent
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name (e.g., "calculate_square")
    fn name(&self) -> &str;

    /// Human-readable description shown to the agent
    fn description(&self) -> &str;

    /// JSON schema of the tool's arguments
    fn parameters(&self) -> Value;

    /// Invoke the tool
    async fn call(&self, arguments: &Map<String, Value>) -> Result<Value>;

    /// Arguments to call this tool with for `message`, if it applies
    ///
    /// Only the local runner consults this; framework-backed runners let the
    /// model decide. Default never applies.
    fn match_message(&self, _message: &str) -> Option<Map<String, Value>> {
        None
    }
}

/// Agent configuration: identity, instructions and tools
#[derive(Clone)]
pub struct AgentDefinition {
    pub name: String,
    pub description: String,
    pub instruction: String,
    tools: Vec<Arc<dyn Tool>>,
}

impl AgentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            instruction: String::new(),
            tools: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Register a tool; a tool with the same name is replaced
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
        self
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}

impl fmt::Debug for AgentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("instruction", &self.instruction)
            .field("tools", &self.tool_names())
            .finish()
    }
}
