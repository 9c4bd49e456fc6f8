//! Gateway configuration
//!
//! Parsed from HCL, or JSON when the document starts with `{`. Every section
//! and field is optional and falls back to its default.
//!
//! ```hcl
//! server {
//!   host         = "127.0.0.1"
//!   port         = 8000
//!   cors_origins = ["http://localhost:3000"]
//! }
//!
//! session {
//!   default_title = "New Chat"
//! }
//!
//! stream {
//!   chunk_size = 1
//!   delay_ms   = 20
//! }
//!
//! agent {
//!   name     = "square_agent"
//!   app_name = "web_chat_app"
//! }
//! ```

use crate::engine::DEFAULT_SESSION_TITLE;
use crate::error::{ChatError, Result};
use crate::gateway::StreamPacing;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub stream: StreamConfig,
    pub agent: AgentConfig,
}

impl ChatConfig {
    /// Parse an HCL (or JSON) document
    pub fn from_hcl(content: &str) -> Result<Self> {
        if content.trim_start().starts_with('{') {
            return serde_json::from_str(content)
                .map_err(|e| ChatError::Config(format!("Failed to parse JSON config: {}", e)));
        }
        hcl::from_str(content)
            .map_err(|e| ChatError::Config(format!("Failed to parse HCL config: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_hcl(&content)
    }

    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Title for sessions created without one
    pub default_title: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_SESSION_TITLE.to_string(),
        }
    }
}

/// Token streaming settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Characters per `token_stream` event
    pub chunk_size: usize,

    /// Pause after each chunk, in milliseconds
    pub delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1,
            delay_ms: 20,
        }
    }
}

impl StreamConfig {
    pub fn pacing(&self) -> StreamPacing {
        StreamPacing::new(self.chunk_size, Duration::from_millis(self.delay_ms))
    }
}

/// Built-in agent definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,

    /// Application name the runners are registered under
    pub app_name: String,

    pub description: String,
    pub instruction: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "square_agent".to_string(),
            app_name: "web_chat_app".to_string(),
            description: "A helpful assistant that can calculate the square of a number."
                .to_string(),
            instruction: "You are a helpful assistant. When asked to square a number, \
                          use the calculate_square tool."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
        assert_eq!(config.session.default_title, "New Chat");
        assert_eq!(config.stream.pacing(), StreamPacing::default());
        assert_eq!(config.agent.app_name, "web_chat_app");
    }

    #[test]
    fn test_parse_hcl() {
        let hcl = r#"
server {
  host         = "0.0.0.0"
  port         = 9000
  cors_origins = ["http://localhost:3000"]
}

stream {
  chunk_size = 4
  delay_ms   = 0
}
"#;
        let config = ChatConfig::from_hcl(hcl).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.stream.pacing(), StreamPacing::new(4, Duration::ZERO));
        // Untouched sections keep their defaults
        assert_eq!(config.session, SessionConfig::default());
        assert_eq!(config.agent, AgentConfig::default());
    }

    #[test]
    fn test_parse_partial_section() {
        let hcl = r#"
agent {
  name = "math_agent"
}
"#;
        let config = ChatConfig::from_hcl(hcl).unwrap();
        assert_eq!(config.agent.name, "math_agent");
        assert_eq!(config.agent.app_name, "web_chat_app");
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"session": {"default_title": "Untitled"}}"#;
        let config = ChatConfig::from_hcl(json).unwrap();
        assert_eq!(config.session.default_title, "Untitled");
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ChatConfig::from_hcl("").unwrap(), ChatConfig::default());
    }

    #[test]
    fn test_parse_invalid() {
        let err = ChatConfig::from_hcl("server {").unwrap_err();
        assert!(matches!(err, ChatError::Config(_)));

        let err = ChatConfig::from_hcl("{ not json").unwrap_err();
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server {{\n  port = 8123\n}}").unwrap();

        let config = ChatConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    fn test_from_missing_file() {
        let err = ChatConfig::from_file(Path::new("/nonexistent/a3s-chat.hcl")).unwrap_err();
        assert!(matches!(err, ChatError::Io(_)));
    }
}
