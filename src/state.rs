use tracing::error;

use crate::completion::CompletionClient;
use crate::config::Args;
use crate::dispatch::MessageDispatcher;
use crate::rate_limit::RateLimiter;

// The three collaborators the webhook needs. Present only when every
// one of them constructed, so handlers check readiness exactly once.
pub struct Services {
    pub completion: CompletionClient,
    pub dispatcher: MessageDispatcher,
    pub limiter: RateLimiter,
}

// Which constructors succeeded at startup, for the status endpoint
#[derive(Debug, Clone, Copy)]
pub struct ServiceStatus {
    pub completion_client: bool,
    pub message_dispatcher: bool,
    pub rate_limiter: bool,
}

impl ServiceStatus {
    pub fn all_ok(&self) -> bool {
        self.completion_client && self.message_dispatcher && self.rate_limiter
    }
}

// App's shared state. A missing credential leaves the process up but
// degraded: /webhook fails fast, /status reports what broke.
pub struct AppState {
    pub services: Option<Services>,
    pub status: ServiceStatus,
    pub rate_limit: u32,
}

impl AppState {
    pub fn from_config(args: &Args) -> Self {
        let completion = CompletionClient::new(args.openai_api_key.as_deref(), &args.openai_api_base)
            .map_err(|e| error!("completion client init failed: {e}"))
            .ok();
        let dispatcher = MessageDispatcher::new(
            args.twilio_account_sid.as_deref(),
            args.twilio_auth_token.as_deref(),
            &args.twilio_phone_number,
            &args.twilio_api_base,
        )
        .map_err(|e| error!("message dispatcher init failed: {e}"))
        .ok();
        let limiter = RateLimiter::new(args.rate_limit as usize);

        let status = ServiceStatus {
            completion_client: completion.is_some(),
            message_dispatcher: dispatcher.is_some(),
            rate_limiter: true,
        };

        let services = match (completion, dispatcher) {
            (Some(completion), Some(dispatcher)) => Some(Services {
                completion,
                dispatcher,
                limiter,
            }),
            _ => None,
        };

        Self {
            services,
            status,
            rate_limit: args.rate_limit,
        }
    }
}
