//! Environment configuration, read once at process start.
//!
//! Recognized variables:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `OPENAI_API_KEY` | Enables live API calls |
//! | `OPENAI_MODEL` | Preferred model, tried before the fallback chain |
//! | `OPENAI_REQUIRE_LIVE` | `1` = fail the run instead of stubbing |
//! | `PRESERVE_MODEL_HTML` | `1` = publish the model's HTML byte-for-byte |
//! | `EMAIL_FROM`, `EMAIL_TO` | Mail envelope; `EMAIL_TO` may be comma-separated |
//! | `GMAIL_USERNAME`, `GMAIL_APP_PASSWORD` | SMTP credentials |
//!
//! Flag variables accept `1`, `true`, or `yes`; anything else is off.

use std::env;

/// Everything the run reads from the environment, snapshotted up front so the
/// rest of the pipeline never touches `std::env`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// API key for the hosted model endpoint. `None` disables live calls.
    pub api_key: Option<String>,
    /// Preferred model override, tried first when set.
    pub model_override: Option<String>,
    /// Fail the run instead of falling back to the stub payload.
    pub require_live: bool,
    /// Skip link normalization and publish `html_body` exactly as received.
    pub preserve_model_html: bool,
    pub email_from: Option<String>,
    pub email_to: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
}

impl Config {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
            model_override: non_empty(env::var("OPENAI_MODEL").ok()),
            require_live: flag_set(env::var("OPENAI_REQUIRE_LIVE").ok()),
            preserve_model_html: flag_set(env::var("PRESERVE_MODEL_HTML").ok()),
            email_from: non_empty(env::var("EMAIL_FROM").ok()),
            email_to: non_empty(env::var("EMAIL_TO").ok()),
            smtp_username: non_empty(env::var("GMAIL_USERNAME").ok()),
            smtp_password: non_empty(env::var("GMAIL_APP_PASSWORD").ok()),
        }
    }

    /// All four mail settings present, so an email can actually be sent.
    pub fn mail_configured(&self) -> bool {
        self.email_from.is_some()
            && self.email_to.is_some()
            && self.smtp_username.is_some()
            && self.smtp_password.is_some()
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn flag_set(v: Option<String>) -> bool {
    matches!(
        v.as_deref().map(str::trim),
        Some("1") | Some("true") | Some("yes")
    )
}
