//! Email notification delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send
//! plain-text notification emails for platform events. Configuration is
//! loaded from environment variables; if `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and no mailer should be
//! constructed.

use crate::bus::{
    PlatformEvent, EVENT_ASSIGNMENT_RETURNED, EVENT_REPORT_COMPLETED, EVENT_REPORT_REJECTED,
    EVENT_REPORT_ROUTED,
};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@civitrack.local";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                    |
    /// |-----------------|----------|----------------------------|
    /// | `SMTP_HOST`     | yes      | —                          |
    /// | `SMTP_PORT`     | no       | `587`                      |
    /// | `SMTP_FROM`     | no       | `noreply@civitrack.local`  |
    /// | `SMTP_USER`     | no       | —                          |
    /// | `SMTP_PASSWORD` | no       | —                          |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Human-readable subject and body for a notification email.
///
/// Unknown event types fall back to a generic rendering so that new events
/// never break delivery.
pub fn render(event: &PlatformEvent) -> (String, String) {
    let report = event.source_entity_id.unwrap_or_default();
    match event.event_type.as_str() {
        EVENT_REPORT_ROUTED => (
            format!("Your report #{report} is on its way"),
            format!(
                "Good news: your report #{report} has been verified and \
                 forwarded to the responsible agencies.\n"
            ),
        ),
        EVENT_REPORT_COMPLETED => {
            let points = event.payload["reward_points"].as_i64().unwrap_or_default();
            (
                format!("Your report #{report} has been resolved"),
                format!(
                    "Your report #{report} has been resolved and verified. \
                     {points} points have been added to your balance.\n"
                ),
            )
        }
        EVENT_REPORT_REJECTED => {
            let reason = event.payload["reason"].as_str().unwrap_or("not specified");
            (
                format!("Your report #{report} was not accepted"),
                format!("Your report #{report} was rejected. Reason: {reason}\n"),
            )
        }
        EVENT_ASSIGNMENT_RETURNED => {
            let notes = event.payload["notes"].as_str().unwrap_or("not specified");
            (
                "An assignment needs rework".to_string(),
                format!("Your supervisor returned an assignment for revision.\nNotes: {notes}\n"),
            )
        }
        other => (
            format!("[Civitrack] {other}"),
            format!(
                "Event: {}\nTime: {}\nDetails: {}\n",
                other,
                event.timestamp,
                serde_json::to_string_pretty(&event.payload).unwrap_or_default()
            ),
        ),
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends notification emails for platform events via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    /// Create a new email delivery service with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send a notification email for the given event to the specified
    /// address.
    pub async fn deliver(&self, to_email: &str, event: &PlatformEvent) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let (subject, body) = render(event);

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = to_email, event_type = %event.event_type, "Notification email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
