mod health;
mod metrics;
mod webhook;

pub use health::{home_handler, status_handler};
pub use metrics::metrics_handler;
pub use webhook::webhook_handler;
