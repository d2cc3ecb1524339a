use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, TextEncoder, register_counter, register_gauge,
    register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("mindease_chat_requests_total", "Total number of chat requests")
            .unwrap();
    pub static ref RATE_LIMITED: Counter = register_counter!(
        "mindease_rate_limited_total",
        "Chat requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref UPSTREAM_FAILURES: Counter = register_counter!(
        "mindease_upstream_failures_total",
        "Model calls that failed or returned unusable output"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "mindease_model_latency_seconds",
        "Model round trip latency in seconds"
    )
    .unwrap();
    pub static ref TRACKED_CLIENTS: Gauge = register_gauge!(
        "mindease_rate_limit_clients",
        "Client identifiers currently tracked by the rate limiter"
    )
    .unwrap();
}

// text exposition of everything in the default registry
pub fn render() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| e.to_string())?;
    String::from_utf8(buffer).map_err(|e| e.to_string())
}
