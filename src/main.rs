use anyhow::Context;
use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use mindease_gateway::{
    AppState, OpenAiClient, config::Args, router, router_with_static, state::cleanup_task,
};

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // parse cli arguments
    let args = Args::parse();
    init_tracing(args.log_json);

    let model = OpenAiClient::new(args.model_settings()).context("building model client")?;

    // creating shared state
    let state = Arc::new(AppState::new(args.rate_limiter(), Arc::new(model)));

    // spawn the background cleanup of expired windows
    if let Some(every) = args.cleanup_interval() {
        tokio::spawn(cleanup_task(Arc::clone(&state), every));
    }

    let app = match &args.static_dir {
        Some(dir) => router_with_static(state, dir),
        None => router(state),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(port = args.port, "gateway running on http://localhost:{}", args.port);
    info!(model = %args.model, api_base = %args.api_base, "forwarding chat to model");
    info!(
        rate_limit = args.rate_limit,
        rate_window_ms = args.rate_window_ms,
        "rate limit per client"
    );
    if let Some(dir) = &args.static_dir {
        info!(dir = %dir.display(), "serving chat UI");
    }

    // peer addresses are needed for client ids when there is no proxy in front
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("gateway stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
