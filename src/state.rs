use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, interval};
use tracing::{debug, info};

use crate::llm::ModelClient;
use crate::metrics::TRACKED_CLIENTS;
use crate::rate_limit::RateLimiter;

// app's shared state
pub struct AppState {
    pub limiter: RateLimiter,          // per-client request counts
    pub model: Arc<dyn ModelClient>,   // who we ask for replies
}

impl AppState {
    pub fn new(limiter: RateLimiter, model: Arc<dyn ModelClient>) -> Self {
        Self { limiter, model }
    }
}

// Drops expired rate limit entries every `every`
pub async fn cleanup_task(state: Arc<AppState>, every: Duration) {
    let mut interval = interval(every);

    info!(interval = ?every, "rate limit cleanup started");

    loop {
        interval.tick().await;

        let removed = state.limiter.purge_stale(Instant::now().into_std());
        TRACKED_CLIENTS.set(state.limiter.len() as f64);

        if removed > 0 {
            debug!(removed, remaining = state.limiter.len(), "purged stale rate limit entries");
        }
    }
}
