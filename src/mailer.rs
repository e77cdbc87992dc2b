//! Email delivery of the finished brief.
//!
//! Sends the same HTML body that was published, over authenticated SMTP with
//! implicit TLS (smtp.gmail.com:465). Missing mail secrets are not an error;
//! the run logs a warning and the page is still published.

use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::error::Error;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::models::NormalizedPayload;

const SMTP_HOST: &str = "smtp.gmail.com";

/// `"{type} Research – {title} – {run_date}"`
pub fn subject_for(payload: &NormalizedPayload) -> String {
    format!(
        "{} Research – {} – {}",
        payload.report_type, payload.title, payload.run_date
    )
}

/// Send the brief to the configured recipients. Skips quietly (with a
/// warning) when any mail secret is absent.
#[instrument(level = "info", skip_all)]
pub async fn send_report_email(
    config: &Config,
    payload: &NormalizedPayload,
) -> Result<(), Box<dyn Error>> {
    if !config.mail_configured() {
        warn!("Email secrets missing; skipping email send");
        return Ok(());
    }

    // mail_configured() guarantees all four are present.
    let email_from = config.email_from.as_deref().unwrap_or_default();
    let email_to = config.email_to.as_deref().unwrap_or_default();
    let username = config.smtp_username.as_deref().unwrap_or_default();
    let password = config.smtp_password.as_deref().unwrap_or_default();

    let mut builder = Message::builder()
        .from(email_from.parse::<Mailbox>()?)
        .subject(subject_for(payload))
        .header(ContentType::TEXT_HTML);
    for recipient in email_to.split(',') {
        builder = builder.to(recipient.trim().parse::<Mailbox>()?);
    }
    let message = builder.body(payload.html_body.clone())?;

    let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(SMTP_HOST)?
        .credentials(Credentials::new(username.to_string(), password.to_string()))
        .build();

    transport.send(message).await?;
    info!(to = %email_to, "Report email sent");
    Ok(())
}
