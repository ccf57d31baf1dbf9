use axum::{Form, Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::WELCOME_MESSAGE;
use crate::metrics::{RATE_LIMITED, REQUEST_LATENCY, REQUEST_TOTAL, WELCOME_SENT};
use crate::models::WebhookForm;
use crate::state::AppState;

// Quota is tracked on the bare number, without the transport prefix
fn rate_key(sender: &str) -> &str {
    sender.strip_prefix("whatsapp:").unwrap_or(sender)
}

pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<WebhookForm>,
) -> (StatusCode, Json<Value>) {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();

    let Some(services) = &state.services else {
        error!("services not properly initialized");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "Service unavailable"})),
        );
    };

    let body = form.body.trim();
    let sender = form.from.as_str();
    info!("received message from {sender} (to {}): {body:?}", form.to);

    if body.is_empty() || sender.is_empty() {
        warn!("missing required fields in webhook request");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing required fields"})),
        );
    }

    let key = rate_key(sender);
    if !services.limiter.is_allowed(key) {
        warn!("rate limit exceeded for {key}");
        RATE_LIMITED.inc();
        services.dispatcher.send_rate_limit_notice(sender).await;
        return (StatusCode::OK, Json(json!({"status": "rate_limited"})));
    }
    debug!(
        "{} of {} requests left this minute for {key}",
        services.limiter.remaining(key),
        state.rate_limit
    );

    // bare "hi"/"y" style pings get the welcome blurb instead of a completion
    if body.chars().count() < 2 {
        WELCOME_SENT.inc();
        services.dispatcher.send(sender, WELCOME_MESSAGE).await;
        return (StatusCode::OK, Json(json!({"status": "welcome_sent"})));
    }

    // generate_response degrades to the apology internally, so from
    // here the only remaining failure is delivery
    let reply = services.completion.generate_response(body).await;
    let delivered = services.dispatcher.send(sender, &reply).await;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    if delivered {
        info!("response sent successfully to {sender}");
        (StatusCode::OK, Json(json!({"status": "message_sent"})))
    } else {
        error!("failed to send response to {sender}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to send response"})),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AppState, ServiceStatus, Services};
    use crate::completion::CompletionClient;
    use crate::dispatch::MessageDispatcher;
    use crate::rate_limit::RateLimiter;
    use axum::{Router, routing::post};

    const FROM: &str = "whatsapp:+919876500000";
    const OWN_NUMBER: &str = "whatsapp:+14155238886";
    // connection refused immediately, no traffic leaves the machine
    const DEAD: &str = "http://127.0.0.1:9";

    // minimal Twilio stand-in that acks every message with a SID
    async fn spawn_fake_twilio() -> String {
        let app = Router::new().route(
            "/2010-04-01/Accounts/{sid}/Messages.json",
            post(|| async { Json(json!({"sid": "SM_test"})) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn app_state(quota: usize, openai_base: &str, twilio_base: &str) -> Arc<AppState> {
        let services = Services {
            completion: CompletionClient::new(Some("sk-test"), openai_base).unwrap(),
            dispatcher: MessageDispatcher::new(Some("AC_test"), Some("token"), OWN_NUMBER, twilio_base)
                .unwrap(),
            limiter: RateLimiter::new(quota),
        };
        Arc::new(AppState {
            services: Some(services),
            status: ServiceStatus {
                completion_client: true,
                message_dispatcher: true,
                rate_limiter: true,
            },
            rate_limit: quota as u32,
        })
    }

    fn form(from: &str, body: &str) -> Form<WebhookForm> {
        Form(WebhookForm {
            from: from.to_string(),
            to: OWN_NUMBER.to_string(),
            body: body.to_string(),
        })
    }

    #[tokio::test]
    async fn degraded_state_fails_fast() {
        let state = Arc::new(AppState {
            services: None,
            status: ServiceStatus {
                completion_client: false,
                message_dispatcher: false,
                rate_limiter: true,
            },
            rate_limit: 10,
        });
        let (code, Json(body)) = webhook_handler(State(state), form(FROM, "hello")).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Service unavailable");
    }

    #[tokio::test]
    async fn empty_body_is_rejected_before_any_client_call() {
        let state = app_state(10, DEAD, DEAD);
        let (code, Json(body)) = webhook_handler(State(state.clone()), form(FROM, "")).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
        // rejected before the rate check: no quota consumed
        let services = state.services.as_ref().unwrap();
        assert_eq!(services.limiter.remaining("+919876500000"), 10);
    }

    #[tokio::test]
    async fn whitespace_body_counts_as_missing() {
        let state = app_state(10, DEAD, DEAD);
        let (code, _) = webhook_handler(State(state), form(FROM, "   ")).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_sender_is_rejected() {
        let state = app_state(10, DEAD, DEAD);
        let (code, _) = webhook_handler(State(state), form("", "hello")).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn over_quota_sender_gets_rate_limited_status() {
        // quota 0 denies everything; the notice send may fail, the
        // webhook outcome is still success-class
        let state = app_state(0, DEAD, DEAD);
        let (code, Json(body)) = webhook_handler(State(state), form(FROM, "hello")).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["status"], "rate_limited");
    }

    #[tokio::test]
    async fn short_body_takes_welcome_path_and_consumes_quota() {
        let state = app_state(10, DEAD, DEAD);
        let (code, Json(body)) = webhook_handler(State(state.clone()), form(FROM, "y")).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["status"], "welcome_sent");
        // the attempt was admitted and recorded before the length check
        let services = state.services.as_ref().unwrap();
        assert_eq!(services.limiter.remaining("+919876500000"), 9);
    }

    #[tokio::test]
    async fn completion_failure_still_delivers_apology() {
        // completion API down, Twilio up: the sender gets the fallback
        // apology and the provider sees a success-class response
        let twilio = spawn_fake_twilio().await;
        let state = app_state(10, DEAD, &twilio);
        let (code, Json(body)) = webhook_handler(State(state), form(FROM, "do you have rooms?")).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["status"], "message_sent");
    }

    #[tokio::test]
    async fn dispatch_failure_surfaces_as_server_error() {
        let state = app_state(10, DEAD, DEAD);
        let (code, Json(body)) = webhook_handler(State(state), form(FROM, "do you have rooms?")).await;
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to send response");
    }

    #[tokio::test]
    async fn sender_matching_own_number_cannot_be_replied_to() {
        // self-send guard fires inside the dispatcher; delivery fails
        let twilio = spawn_fake_twilio().await;
        let state = app_state(10, DEAD, &twilio);
        let (code, _) = webhook_handler(State(state), form(OWN_NUMBER, "loop?")).await;
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn repeated_messages_past_quota_get_limited() {
        let twilio = spawn_fake_twilio().await;
        let state = app_state(2, DEAD, &twilio);
        for _ in 0..2 {
            let (code, _) = webhook_handler(State(state.clone()), form(FROM, "hello there")).await;
            assert_eq!(code, StatusCode::OK);
        }
        let (code, Json(body)) = webhook_handler(State(state), form(FROM, "hello there")).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["status"], "rate_limited");
    }
}
