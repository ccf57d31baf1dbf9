use clap::Parser;

// CLI argument structure - every knob is also environment-sourced so
// the deployed service needs no flags at all
#[derive(Parser, Debug, Clone)]
#[command(name = "royal-pg-bot")]
#[command(about = "WhatsApp relay bot for Royal PG inquiries")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    // OpenAI API key (service runs degraded without it)
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    // OpenAI base URL, overridable for testing
    #[arg(long, env = "OPENAI_API_BASE", default_value = "https://api.openai.com")]
    pub openai_api_base: String,

    // Twilio account SID
    #[arg(long, env = "TWILIO_ACCOUNT_SID")]
    pub twilio_account_sid: Option<String>,

    // Twilio auth token
    #[arg(long, env = "TWILIO_AUTH_TOKEN")]
    pub twilio_auth_token: Option<String>,

    // Outbound WhatsApp number, defaults to the Twilio sandbox
    #[arg(long, env = "TWILIO_PHONE_NUMBER", default_value = "whatsapp:+14155238886")]
    pub twilio_phone_number: String,

    // Twilio base URL, overridable for testing
    #[arg(long, env = "TWILIO_API_BASE", default_value = "https://api.twilio.com")]
    pub twilio_api_base: String,

    // Session secret, carried for deployment parity with the hosting setup
    #[arg(long, env = "SESSION_SECRET", default_value = "fallback-secret-key")]
    pub session_secret: String,

    // Max webhook requests per sender per rolling minute
    #[arg(long, env = "RATE_LIMIT_PER_MINUTE", default_value_t = 10)]
    pub rate_limit: u32,
}

pub const FALLBACK_SECRET: &str = "fallback-secret-key";

// System prompt sent with every completion request. The persona and
// property facts are fixed, not user-customizable.
pub const SYSTEM_PROMPT: &str = "\
You are a helpful assistant for Royal PG. Answer questions about the \
accommodation using the information below. Keep replies short and \
friendly, suitable for WhatsApp.

Royal PG is a premium accommodation facility located in Bangalore, specifically designed for students and working professionals.

ACCOMMODATION DETAILS:
- 2-sharing rooms: \u{20b9}8,500 per month
- 3-sharing rooms: \u{20b9}7,000 per month
- 4-sharing rooms: \u{20b9}6,000 per month

FACILITIES INCLUDED:
- Unlimited meals (breakfast, lunch, dinner, and evening snacks)
- High-speed WiFi throughout the premises
- Laundry services
- 24/7 water supply
- Power backup
- Common areas for recreation
- Study rooms
- Parking facility
- Security with CCTV surveillance

LOCATION BENEFITS:
- Close proximity to Oxford Engineering College
- Near Dayananda Sagar Engineering College
- Good connectivity to major IT hubs
- Easy access to public transport

CONTACT INFORMATION:
- Address: Near Oxford & Dayananda Sagar Engineering Colleges, Bangalore
- Phone: +91-9876543210
- Email: info@royalpg.com

ADDITIONAL SERVICES:
- Room cleaning service
- Maintenance support
- Common kitchen access
- Recreation facilities
- Study environment

The PG maintains high standards of cleanliness, safety, and provides a comfortable living environment for students and professionals.";

pub const WELCOME_MESSAGE: &str = "Hello! \u{1f44b} Welcome to Royal PG. I'm here to help with information about \
our accommodation facilities near Oxford and Dayananda Sagar Engineering Colleges. \
Ask me about rooms, pricing, facilities, or location!";
