use axum::{
    Json,
    body::{Body, to_bytes},
    extract::State,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::client_id::ClientId;
use crate::error::{ChatError, ChatResult};
use crate::metrics::{RATE_LIMITED, REQUEST_LATENCY, REQUEST_TOTAL, UPSTREAM_FAILURES};
use crate::models::{ChatReply, ChatRequest};
use crate::prompt::{SYSTEM_PROMPT, user_turn};
use crate::sanitize::{SanitizeError, parse_and_sanitize};
use crate::state::AppState;

const MESSAGE_REQUIRED: &str = "Message required and must be a non-empty string";
const BODY_TOO_LARGE: &str = "Request body too large";

pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    ClientId(client_id): ClientId,
    body: Body,
) -> ChatResult<Json<ChatReply>> {
    REQUEST_TOTAL.inc();

    // gate before anything else, the model is never called for a rejected client
    if !state.limiter.check(&client_id) {
        RATE_LIMITED.inc();
        info!(client = %client_id, "chat request rate limited");
        return Err(ChatError::RateLimited);
    }

    // body is only read once the client has been admitted and counted
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| ChatError::invalid_input(BODY_TOO_LARGE))?;
    let message = parse_message(&body)?;

    let start_time = Instant::now();
    let result = state.model.complete(SYSTEM_PROMPT, &user_turn(&message)).await;
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    let text = result.map_err(|e| {
        UPSTREAM_FAILURES.inc();
        error!(client = %client_id, error = %e, "model call failed");
        ChatError::UpstreamFailure {
            message: "Server error".to_string(),
            raw: None,
            detail: Some(e.to_string()),
        }
    })?;

    if text.is_empty() {
        UPSTREAM_FAILURES.inc();
        warn!(client = %client_id, "model returned no content");
        return Err(ChatError::upstream("No response from model"));
    }

    let reply = parse_and_sanitize(&text).map_err(|e| {
        UPSTREAM_FAILURES.inc();
        warn!(client = %client_id, error = %e, "unusable model output");
        let message = e.to_string();
        match e {
            SanitizeError::Unparsable { raw } => ChatError::UpstreamFailure {
                message,
                raw: Some(raw),
                detail: None,
            },
            SanitizeError::EmptyReply => ChatError::upstream(message),
        }
    })?;

    info!(client = %client_id, mood = ?reply.mood, resources = reply.resources.len(), "chat reply sent");
    Ok(Json(reply))
}

pub async fn method_not_allowed() -> ChatError {
    ChatError::MethodNotAllowed
}

// an empty body is read as `{}`, anything that is not a JSON object fails validation
fn parse_message(body: &[u8]) -> ChatResult<String> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ChatRequest::default()
    } else {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => ChatRequest {
                message: fields.get("message").cloned(),
            },
            _ => return Err(ChatError::invalid_input(MESSAGE_REQUIRED)),
        }
    };

    request
        .message_text()
        .map(str::to_string)
        .ok_or_else(|| ChatError::invalid_input(MESSAGE_REQUIRED))
}
