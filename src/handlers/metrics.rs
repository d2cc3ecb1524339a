use axum::extract::State;
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::error::ChatError;
use crate::metrics::{TRACKED_CLIENTS, render};
use crate::state::AppState;

pub async fn metrics_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ChatError> {
    TRACKED_CLIENTS.set(state.limiter.len() as f64);
    render().map_err(ChatError::Internal)
}
