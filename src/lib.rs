//! # a3s-chat
//!
//! Session-multiplexed streaming chat gateway for tool-calling agents in the
//! A3S ecosystem.
//!
//! ## Overview
//!
//! `a3s-chat` keeps an in-memory registry of chat sessions, binds one agent
//! runner to each session, and streams every turn to the client over a
//! WebSocket as typed, timestamped events: the echoed user message, tool-call
//! start/result pairs, incremental reply tokens, the full reply and a
//! completion marker. A small REST surface manages sessions.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use a3s_chat::{AgentDefinition, CalculateSquare, ChatEngine, LocalRunnerFactory};
//! use a3s_chat::gateway::{ServerEvent, StreamPacing};
//!
//! # async fn example() -> a3s_chat::Result<()> {
//! let agent = AgentDefinition::new("square_agent").with_tool(Arc::new(CalculateSquare));
//! let engine = ChatEngine::new(Arc::new(LocalRunnerFactory::new(agent, "web_chat_app")))
//!     .with_pacing(StreamPacing::immediate());
//!
//! let session_id = engine.create_session(Some("Math")).await;
//! let mut events: Vec<ServerEvent> = Vec::new();
//! engine.run_turn(&session_id, "What is the square of 12?", &mut events).await?;
//!
//! for event in &events {
//!     println!("{}", event.kind());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **SessionStore**: sessions and their message history
//! - **RunnerPool**: one lazily created agent runner per session
//! - **AgentRunner** / **RunnerFactory** traits: the agent framework seam
//! - **ChatEngine**: turn execution shared by REST and WebSocket
//! - **gateway**: wire events, token pacing and the WebSocket handler
//! - **api**: axum router with CORS and request tracing

pub mod agent;
pub mod api;
pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod pool;
pub mod store;
pub mod types;

// Re-export core types
pub use agent::{
    AgentDefinition, AgentEvent, AgentEventStream, AgentRunner, CalculateSquare,
    LocalRunner, LocalRunnerFactory, RunnerFactory, Tool,
};
pub use api::{build_app, chat_router, AppState};
pub use config::ChatConfig;
pub use engine::{ChatEngine, DEFAULT_SESSION_TITLE};
pub use error::{ChatError, ErrorCode, Result};
pub use pool::RunnerPool;
pub use store::SessionStore;
pub use types::{Message, Role, Session, SessionSummary, ToolCallRecord, ToolCallStatus};
