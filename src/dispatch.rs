use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};

use crate::metrics::DISPATCH_FAILURES;

const WHATSAPP_PREFIX: &str = "whatsapp:";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const RATE_LIMIT_NOTICE: &str = "\u{23f3} You've reached the message limit. Please wait a minute before sending another message.\n\
For urgent inquiries, call \u{1f4de} +91-9876543210 directly.";

// Outbound WhatsApp delivery via the Twilio messages API. Errors never
// escape: callers get a bool and the failure is logged here.
pub struct MessageDispatcher {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    api_base: String,
}

// Twilio acknowledges accepted messages with a SID
#[derive(Deserialize)]
struct MessageAck {
    sid: String,
}

impl MessageDispatcher {
    pub fn new(
        account_sid: Option<&str>,
        auth_token: Option<&str>,
        from_number: &str,
        api_base: &str,
    ) -> Result<Self, Error> {
        let account_sid = match account_sid {
            Some(sid) if !sid.is_empty() => sid.to_string(),
            _ => return Err(Error::MissingCredential("TWILIO_ACCOUNT_SID")),
        };
        let auth_token = match auth_token {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => return Err(Error::MissingCredential("TWILIO_AUTH_TOKEN")),
        };

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            account_sid,
            auth_token,
            from_number: from_number.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    // True only on confirmed acceptance by Twilio. Normalizes the
    // address and refuses to message our own number.
    pub async fn send(&self, to: &str, body: &str) -> bool {
        let to = if to.starts_with(WHATSAPP_PREFIX) {
            to.to_string()
        } else {
            format!("{WHATSAPP_PREFIX}{to}")
        };

        if to == self.from_number {
            error!("attempted to send a message to our own number {to}, aborting");
            return false;
        }

        match self.create_message(&to, body).await {
            Ok(sid) => {
                info!("message sent to {to}, sid {sid}");
                true
            }
            Err(e) => {
                error!("failed to send message to {to}: {e}");
                DISPATCH_FAILURES.inc();
                false
            }
        }
    }

    pub async fn send_rate_limit_notice(&self, to: &str) -> bool {
        self.send(to, RATE_LIMIT_NOTICE).await
    }

    async fn create_message(&self, to: &str, body: &str) -> Result<String, Error> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        );
        let params = [
            ("From", self.from_number.as_str()),
            ("To", to),
            ("Body", body),
        ];

        let response = self
            .http
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!("{status}: {body}")));
        }

        let ack: MessageAck = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(ack.sid)
    }
}

#[derive(Debug)]
pub enum Error {
    MissingCredential(&'static str),
    Http(String),
    Api(String),
    Parse(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingCredential(name) => write!(f, "{name} is required"),
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Api(e) => write!(f, "API error: {e}"),
            Error::Parse(e) => write!(f, "Parse error: {e}"),
        }
    }
}

impl std::error::Error for Error {}
