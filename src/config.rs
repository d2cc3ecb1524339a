use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::llm::ModelSettings;
use crate::rate_limit::{DEFAULT_MAX_PER_WINDOW, RateLimiter};

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "mindease-gateway")]
#[command(about = "Rate limited chat backend for the MindEase assistant")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Rate limit max requests per window, per client
    #[arg(long, default_value_t = DEFAULT_MAX_PER_WINDOW)]
    pub rate_limit: u32,

    // Rate limit window in milliseconds
    #[arg(long, default_value_t = 60_000)]
    pub rate_window_ms: u64,

    // How often stale rate limit entries are dropped, seconds (0 = never)
    #[arg(long, default_value_t = 300)]
    pub cleanup_interval: u64,

    // Provider credential, read once at startup
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, default_value = "https://api.openai.com/v1")]
    pub api_base: String,

    #[arg(short, long, default_value = "gpt-3.5-turbo")]
    pub model: String,

    #[arg(long, default_value_t = 400)]
    pub max_tokens: u32,

    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,

    // Upstream request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    // Directory with the chat UI, served at /
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    // Log as JSON lines instead of plain text
    #[arg(long)]
    pub log_json: bool,
}

impl Args {
    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.rate_limit, Duration::from_millis(self.rate_window_ms))
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            base_url: self.api_base.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: Duration::from_secs(self.timeout),
        }
    }

    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval > 0).then(|| Duration::from_secs(self.cleanup_interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["mindease-gateway", "--api-key", "sk-test"]).unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.rate_limit, 8);

        let limiter = args.rate_limiter();
        assert_eq!(limiter.max_per_window(), 8);
        assert_eq!(limiter.window(), Duration::from_millis(60_000));

        let model = args.model_settings();
        assert_eq!(model.model, "gpt-3.5-turbo");
        assert_eq!(model.max_tokens, 400);
        assert_eq!(args.cleanup_interval(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn zero_cleanup_interval_disables_purge() {
        let args = Args::try_parse_from([
            "mindease-gateway",
            "--api-key",
            "sk-test",
            "--cleanup-interval",
            "0",
        ])
        .unwrap();
        assert_eq!(args.cleanup_interval(), None);
    }
}
