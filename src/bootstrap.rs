//! Shared startup: config loading, engine construction and serving

use crate::agent::{AgentDefinition, CalculateSquare, LocalRunnerFactory};
use crate::api::{build_app, AppState};
use crate::config::ChatConfig;
use crate::engine::ChatEngine;
use crate::gateway::{EventSink, ServerEvent};
use crate::types::Role;
use anyhow::{Context, Result};
use axum::Router;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOCAL_CONFIG_FILE: &str = "a3s-chat.hcl";

/// Load configuration
///
/// Priority: explicit path > `./a3s-chat.hcl` > `<config_dir>/a3s-chat/config.hcl`
/// > defaults. Returns the config and the file it came from, if any.
pub fn load_config(explicit_path: Option<&PathBuf>) -> Result<(ChatConfig, Option<PathBuf>)> {
    let path = match explicit_path {
        Some(path) => Some(path.clone()),
        None => find_config(),
    };

    let Some(path) = path else {
        tracing::info!("No config found, using defaults");
        return Ok((ChatConfig::default(), None));
    };

    tracing::info!("Loading config from {}", path.display());
    let config = ChatConfig::from_file(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok((config, Some(path)))
}

fn find_config() -> Option<PathBuf> {
    let local = Path::new(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local.to_path_buf());
    }
    dirs::config_dir()
        .map(|dir| dir.join("a3s-chat").join("config.hcl"))
        .filter(|path| path.exists())
}

/// Agent definition described by the config, with the built-in tools
pub fn build_definition(config: &ChatConfig) -> AgentDefinition {
    AgentDefinition::new(&config.agent.name)
        .with_description(&config.agent.description)
        .with_instruction(&config.agent.instruction)
        .with_tool(Arc::new(CalculateSquare))
}

/// Engine backed by the local runner
pub fn build_engine(config: &ChatConfig) -> ChatEngine {
    let factory = LocalRunnerFactory::new(build_definition(config), &config.agent.app_name);
    ChatEngine::new(Arc::new(factory))
        .with_pacing(config.stream.pacing())
        .with_default_title(&config.session.default_title)
}

/// Application router for `config`
pub fn build_router(config: &ChatConfig) -> Router {
    let engine = Arc::new(build_engine(config));
    build_app(AppState::new(engine), &config.server.cors_origins)
}

/// Bind, serve until Ctrl-C, then return
pub async fn run_server(config: ChatConfig) -> Result<()> {
    let addr: std::net::SocketAddr = config
        .bind_address()
        .parse()
        .context("Invalid listen address")?;
    let app = build_router(&config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, agent = %config.agent.name, "Chat gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .context("HTTP server error")?;

    tracing::info!("Shutting down...");
    Ok(())
}

/// Run a single turn against a fresh in-memory session, without a server
///
/// Events go to `sink` as they are produced. Returns the final assistant
/// reply, or `None` when the turn produced no text.
pub async fn run_in_memory(
    config: &ChatConfig,
    query: &str,
    sink: &mut dyn EventSink,
) -> Result<Option<String>> {
    let engine = build_engine(config);
    let session_id = engine.create_session(None).await;
    tracing::debug!(session_id = %session_id, "Running in-memory turn");

    engine
        .run_turn(&session_id, query, sink)
        .await
        .context("Turn aborted")?;

    let reply = engine
        .messages(&session_id)
        .await
        .unwrap_or_default()
        .into_iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.content);
    Ok(reply)
}

/// Terminal rendering of one event for `a3s-chat run`
pub fn render_event(event: &ServerEvent) -> String {
    match event {
        ServerEvent::UserMessage { content, .. } => format!("> {}\n", content),
        ServerEvent::ToolCallStart { tool_call, .. } => format!(
            "[tool] {}({})\n",
            tool_call.name,
            serde_json::Value::Object(tool_call.arguments.clone())
        ),
        ServerEvent::ToolCallResult { tool_call, .. } => {
            let result = tool_call
                .result
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "null".to_string());
            format!(
                "[tool] {} -> {} ({})\n",
                tool_call.name,
                result,
                wire_name(&tool_call.status)
            )
        }
        ServerEvent::TokenStream { content, .. } => content.clone(),
        ServerEvent::AssistantResponse { .. } => "\n".to_string(),
        ServerEvent::ResponseComplete { .. } => String::new(),
        ServerEvent::Error { code, message, .. } => {
            format!("[error] {}: {}\n", wire_name(code), message)
        }
    }
}

fn wire_name(value: &impl Serialize) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => name,
        _ => String::new(),
    }
}
