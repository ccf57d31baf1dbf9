use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("relay_webhook_requests_total", "Total number of webhook requests").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("relay_rate_limited_total", "Webhook requests denied by the rate limiter").unwrap();
    pub static ref WELCOME_SENT: Counter =
        register_counter!("relay_welcome_sent_total", "Welcome messages sent for short inputs").unwrap();
    pub static ref COMPLETION_FAILURES: Counter =
        register_counter!("relay_completion_failures_total", "Completion API calls that fell back to the apology").unwrap();
    pub static ref DISPATCH_FAILURES: Counter =
        register_counter!("relay_dispatch_failures_total", "Outbound messages Twilio did not accept").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "relay_webhook_latency_seconds",
        "Webhook handling latency in seconds"
    )
    .unwrap();
}
