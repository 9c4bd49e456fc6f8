//! HTTP surface: REST session management and the WebSocket route
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/` | service banner |
//! | GET | `/health` | health check |
//! | GET | `/api/sessions` | list sessions |
//! | POST | `/api/sessions?title=` | create session |
//! | GET | `/api/sessions/:id/messages` | session history |
//! | DELETE | `/api/sessions/:id` | delete session |
//! | GET | `/ws/chat/:id` | WebSocket chat |

use crate::engine::ChatEngine;
use crate::gateway::ws_chat_upgrade;
use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for all routes
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
}

impl AppState {
    pub fn new(engine: Arc<ChatEngine>) -> Self {
        Self { engine }
    }
}

/// Routes without middleware
pub fn chat_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_banner))
        .route("/health", get(health_check))
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/:session_id", delete(delete_session))
        .route("/api/sessions/:session_id/messages", get(get_messages))
        .route("/ws/chat/:session_id", get(ws_chat_upgrade))
        .with_state(state)
}

/// Full application: routes plus CORS and request tracing
pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    chat_router(state)
        .layer(build_cors(cors_origins))
        .layer(TraceLayer::new_for_http())
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /
async fn service_banner() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "A3S Chat API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "sessions": "/api/sessions",
            "messages": "/api/sessions/{session_id}/messages",
            "websocket": "/ws/chat/{session_id}",
            "health": "/health",
        },
    }))
}

/// GET /health
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/sessions
async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.engine.list_sessions().await;
    Json(serde_json::json!({ "sessions": sessions }))
}

#[derive(Debug, Deserialize)]
struct CreateSessionParams {
    title: Option<String>,
}

/// POST /api/sessions?title=
async fn create_session(
    State(state): State<AppState>,
    Query(params): Query<CreateSessionParams>,
) -> impl IntoResponse {
    let session_id = state.engine.create_session(params.title.as_deref()).await;
    Json(serde_json::json!({
        "session_id": session_id,
        "message": "Session created",
    }))
}

/// GET /api/sessions/:session_id/messages
async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.engine.messages(&session_id).await {
        Some(messages) => (
            StatusCode::OK,
            Json(serde_json::json!({ "messages": messages })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Session not found" })),
        ),
    }
}

/// DELETE /api/sessions/:session_id
async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    if !state.engine.delete_session(&session_id).await {
        tracing::debug!(session_id = %session_id, "Delete requested for unknown session");
    }
    Json(serde_json::json!({ "message": "Session deleted" }))
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentDefinition, CalculateSquare, LocalRunnerFactory};
    use crate::gateway::{ServerEvent, StreamPacing};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn state() -> AppState {
        let def = AgentDefinition::new("square_agent").with_tool(Arc::new(CalculateSquare));
        let engine = ChatEngine::new(Arc::new(LocalRunnerFactory::new(def, "web_chat_app")))
            .with_pacing(StreamPacing::immediate());
        AppState::new(Arc::new(engine))
    }

    async fn call(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let resp = health_check().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_service_banner_lists_endpoints() {
        let (status, body) = call(chat_router(state()), Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoints"]["websocket"], "/ws/chat/{session_id}");
    }

    #[tokio::test]
    async fn test_create_and_list_sessions() {
        let state = state();

        let (status, body) = call(
            chat_router(state.clone()),
            Method::POST,
            "/api/sessions?title=Math",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Session created");
        let id = body["session_id"].as_str().unwrap().to_string();

        let (_, body) = call(chat_router(state.clone()), Method::POST, "/api/sessions").await;
        let untitled = body["session_id"].as_str().unwrap().to_string();

        let (status, body) = call(chat_router(state.clone()), Method::GET, "/api/sessions").await;
        assert_eq!(status, StatusCode::OK);
        let sessions = body["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 2);

        let title_of = |sid: &str| {
            sessions
                .iter()
                .find(|s| s["id"] == sid)
                .map(|s| s["title"].as_str().unwrap().to_string())
                .unwrap()
        };
        assert_eq!(title_of(&id), "Math");
        assert_eq!(title_of(&untitled), "New Chat");
        assert!(sessions[0].get("messages").is_none());
    }

    #[tokio::test]
    async fn test_get_messages() {
        let state = state();
        let id = state.engine.create_session(None).await;
        let mut sink: Vec<ServerEvent> = Vec::new();
        state.engine.run_turn(&id, "square 5", &mut sink).await.unwrap();

        let (status, body) = call(
            chat_router(state),
            Method::GET,
            &format!("/api/sessions/{}/messages", id),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["tool_calls"][0]["status"], "success");
        assert_eq!(messages[1]["tool_calls"][0]["result"], 25);
    }

    #[tokio::test]
    async fn test_get_messages_unknown_session() {
        let (status, body) = call(
            chat_router(state()),
            Method::GET,
            "/api/sessions/missing/messages",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Session not found");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let state = state();
        let id = state.engine.create_session(None).await;
        let uri = format!("/api/sessions/{}", id);

        for _ in 0..2 {
            let (status, body) = call(chat_router(state.clone()), Method::DELETE, &uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["message"], "Session deleted");
        }
        assert!(state.engine.messages(&id).await.is_none());
    }

    #[test]
    fn test_build_cors() {
        let _any = build_cors(&[]);
        let _listed = build_cors(&["http://localhost:3000".to_string()]);
    }
}
