//! Streaming gateway
//!
//! Bridges a WebSocket connection to the [`ChatEngine`](crate::engine::ChatEngine):
//!
//! ```text
//! Client ──{message}──► handler ──► ChatEngine::run_turn ──► AgentRunner
//!    ▲                                   │
//!    └──── user_message, tool_call_*, token_stream,
//!          assistant_response, response_complete, error
//! ```

pub mod events;
pub mod handler;
pub mod pacing;
pub mod turn;

pub use events::{ClientMessage, ServerEvent};
pub use handler::{handle_chat_ws, ws_chat_upgrade, ConnectionState};
pub use pacing::StreamPacing;
pub use turn::{stream_turn, EventSink, TurnState};
