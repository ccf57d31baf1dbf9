mod completion;
mod config;
mod dispatch;
mod handlers;
mod metrics;
mod models;
mod rate_limit;
mod state;

use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use config::Args;
use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.session_secret == config::FALLBACK_SECRET {
        warn!("SESSION_SECRET is unset, using the fallback development secret");
    }

    // Missing credentials keep the process up in degraded mode so
    // /status can report what broke
    let state = Arc::new(AppState::from_config(&args));
    if state.services.is_some() {
        info!("all services initialized successfully");
    } else {
        warn!("running degraded, /webhook will fail fast until credentials are provided");
    }

    let app = Router::new()
        .route("/", get(handlers::home_handler))
        .route("/webhook", post(handlers::webhook_handler))
        .route("/status", get(handlers::status_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listener");

    info!("Royal PG WhatsApp bot listening on http://localhost:{}", args.port);
    info!("Rate limit: {} requests per minute per sender", args.rate_limit);
    axum::serve(listener, app).await.expect("server error");
}
