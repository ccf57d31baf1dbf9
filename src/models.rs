use serde::Deserialize;

// Twilio webhook form fields (form-encoded POST). Fields default to
// empty so the handler can answer missing data with a 400 instead of
// letting the extractor reject the request.
#[derive(Deserialize, Debug, Clone)]
pub struct WebhookForm {
    // Sender address, e.g. "whatsapp:+919876500000"
    #[serde(rename = "From", default)]
    pub from: String,

    // Our sandbox number the message was addressed to
    #[serde(rename = "To", default)]
    pub to: String,

    // Message text
    #[serde(rename = "Body", default)]
    pub body: String,
}
