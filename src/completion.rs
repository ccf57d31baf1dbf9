use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;

use crate::config::SYSTEM_PROMPT;
use crate::metrics::COMPLETION_FAILURES;

const MODEL: &str = "gpt-3.5-turbo";
const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

// What the sender sees when the completion API is down. Points at the
// phone line so they still have a way to reach the property.
const FALLBACK_REPLY: &str = "Sorry, I couldn't process your message at the moment. \
For urgent inquiries, call +91-9876543210 directly.";

// Single-turn chat completion client. One request per inbound message,
// no retry, no conversation memory.
pub struct CompletionClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'static str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl CompletionClient {
    pub fn new(api_key: Option<&str>, api_base: &str) -> Result<Self, Error> {
        let api_key = match api_key {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Err(Error::MissingCredential("OPENAI_API_KEY")),
        };

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    // Never fails from the caller's perspective: any upstream problem
    // collapses into the canned apology after being logged and counted.
    pub async fn generate_response(&self, user_text: &str) -> String {
        match self.complete(user_text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("completion request failed: {e}");
                COMPLETION_FAILURES.inc();
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn complete(&self, user_text: &str) -> Result<String, Error> {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: user_text },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!("{status}: {body}")));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or(Error::Empty)
    }
}

#[derive(Debug)]
pub enum Error {
    MissingCredential(&'static str),
    Http(String),
    Api(String),
    Parse(String),
    Empty,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingCredential(name) => write!(f, "{name} is required"),
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Api(e) => write!(f, "API error: {e}"),
            Error::Parse(e) => write!(f, "Parse error: {e}"),
            Error::Empty => write!(f, "Empty choice list"),
        }
    }
}

impl std::error::Error for Error {}
