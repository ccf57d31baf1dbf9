use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::state::AppState;

// Liveness: the process is up
pub async fn home_handler() -> Json<Value> {
    Json(json!({
        "status": "running",
        "service": "Royal PG WhatsApp Bot",
        "message": "Bot is ready to handle WhatsApp messages",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

// Readiness: which collaborators constructed at startup
pub async fn status_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let status = state.status;
    let (code, overall) = if status.all_ok() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(json!({
            "status": overall,
            "services": {
                "completion_client": status.completion_client,
                "message_dispatcher": status.message_dispatcher,
                "rate_limiter": status.rate_limiter,
            },
            "rate_limit_per_minute": state.rate_limit,
        })),
    )
}
