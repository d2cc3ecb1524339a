//! MindEase gateway
//!
//! HTTP backend for the MindEase chat UI. `POST /api/chat` is gated by a
//! per-client fixed-window rate limiter, then forwarded to a chat model
//! whose JSON answer is sanitized into a [`models::ChatReply`].

pub mod client_id;
pub mod config;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod metrics;
pub mod models;
pub mod prompt;
pub mod rate_limit;
pub mod sanitize;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub use error::{ChatError, ChatResult};
pub use llm::{ModelClient, ModelError, OpenAiClient};
pub use rate_limit::RateLimiter;
pub use state::AppState;

// creating the router with routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/api/chat",
            post(handlers::chat_handler).fallback(handlers::method_not_allowed),
        )
        .route("/metrics", get(handlers::metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// same routes, plus the chat UI served from `dir`
pub fn router_with_static(state: Arc<AppState>, dir: &Path) -> Router {
    router(state).fallback_service(ServeDir::new(dir))
}
