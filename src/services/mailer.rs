//! Outbound email capability.
//!
//! The reset orchestrator only sees the [`Mailer`] trait; SMTP wiring lives
//! in [`SmtpMailer`], and [`NoopMailer`] stands in when email is disabled.

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::config::EmailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Failed to build email: {0}")]
    Message(String),

    #[error("SMTP error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self, MailError> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| MailError::Transport(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        let from = Mailbox::from_str(&format!("{} <{}>", config.from_name, config.from_address))
            .map_err(|e| MailError::Address(format!("Invalid from address: {e}")))?;

        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| MailError::Address(format!("Invalid recipient address: {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Message(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// Fallback used when email is disabled: the message is logged and dropped.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), MailError> {
        tracing::info!("Email disabled; dropping message to {to}: {subject}");
        Ok(())
    }
}

/// Build the mailer for the configured transport. An unusable SMTP config
/// degrades to [`NoopMailer`] with a warning instead of refusing to start.
pub fn build_mailer(config: &EmailConfig) -> Arc<dyn Mailer> {
    if !config.enabled {
        return Arc::new(NoopMailer);
    }

    match SmtpMailer::new(config) {
        Ok(mailer) => {
            tracing::info!("SMTP mailer initialized for {}", config.smtp_host);
            Arc::new(mailer)
        }
        Err(e) => {
            tracing::warn!("Failed to initialize SMTP mailer: {e}. Emails will be dropped.");
            Arc::new(NoopMailer)
        }
    }
}
