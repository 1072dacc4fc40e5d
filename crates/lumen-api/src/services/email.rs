//! Email service for contact form messages.
//!
//! Delivers over SMTP when configured. Otherwise it stands in as a stub that only
//! logs the message and reports success.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tracing::info;

use lumen_core::{AppError, Config};

#[derive(Clone)]
struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

#[derive(Clone, Default)]
pub struct EmailService {
    mailer: Option<SmtpMailer>,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl EmailService {
    /// Stub service: logs every message, sends nothing.
    pub fn disabled() -> Self {
        Self { mailer: None }
    }

    /// Build from config. Falls back to the stub when email is disabled or SMTP is
    /// incomplete.
    pub fn from_config(config: &Config) -> Self {
        if !config.email_enabled() {
            tracing::debug!("Email delivery disabled (EMAIL_ENABLED=false)");
            return Self::disabled();
        }
        let (Some(host), Some(from)) = (config.smtp_host(), config.smtp_from()) else {
            tracing::warn!("Email enabled but SMTP_HOST or SMTP_FROM missing; using stub");
            return Self::disabled();
        };
        let port = config.smtp_port().unwrap_or(587);

        let builder = if config.smtp_tls() {
            match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host) {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(error = %e, host = %host, "Invalid SMTP relay; using stub");
                    return Self::disabled();
                }
            }
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };
        let builder = builder.port(port);
        let builder = match (config.smtp_user(), config.smtp_password()) {
            (Some(u), Some(p)) => builder.credentials(Credentials::new(u.to_string(), p.to_string())),
            _ => builder,
        };

        tracing::info!(
            host = %host,
            port = port,
            starttls = config.smtp_tls(),
            "Email service initialized (SMTP)"
        );

        Self {
            mailer: Some(SmtpMailer {
                transport: Arc::new(builder.build()),
                from: from.to_string(),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    /// Send a plain-text email to the given recipients.
    pub async fn send(
        &self,
        to: &[String],
        subject: &str,
        body_plain: &str,
        reply_to: Option<&str>,
    ) -> Result<(), AppError> {
        if to.is_empty() {
            tracing::debug!(subject = %subject, "No recipients; email skipped");
            return Ok(());
        }

        let Some(mailer) = &self.mailer else {
            info!(
                recipients = to.len(),
                subject = %subject,
                "Email delivery disabled; message logged only"
            );
            return Ok(());
        };

        let to_addrs: Vec<Mailbox> = to.iter().filter_map(|s| s.parse().ok()).collect();
        if to_addrs.is_empty() {
            return Err(AppError::Email("No valid recipient addresses".to_string()));
        }
        let from_addr: Mailbox = mailer
            .from
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid SMTP_FROM: {}", e)))?;

        let mut builder = Message::builder().from(from_addr).subject(subject);
        for mb in to_addrs {
            builder = builder.to(mb);
        }
        if let Some(reply_to) = reply_to.and_then(|r| r.parse::<Mailbox>().ok()) {
            builder = builder.reply_to(reply_to);
        }
        let email = builder
            .header(ContentType::TEXT_PLAIN)
            .body(body_plain.to_string())
            .map_err(|e| AppError::Email(e.to_string()))?;

        mailer
            .transport
            .send(email)
            .await
            .map_err(|e| AppError::Email(e.to_string()))?;
        info!(count = to.len(), "Email sent");
        Ok(())
    }
}
