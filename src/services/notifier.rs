//! Outbound email for verification codes and password-reset links.
//!
//! The transport is built once at start-up and injected into the services as
//! `Arc<dyn Notifier>`. A missing or broken SMTP configuration does not stop the
//! server: it is logged, and every send then fails with `NotifyError::NotConfigured`,
//! which the services surface to callers as `DeliveryFailed`.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

use crate::config::environment::{Config, MailTransport, SmtpConfig};
use crate::modules::accounts::model::Role;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("mail transport is not configured")]
    NotConfigured,

    #[error("invalid address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_verification(&self, email: &str, code: &str, role: Role) -> Result<(), NotifyError>;
    async fn send_reset_link(&self, email: &str, token: &str, role: Role) -> Result<(), NotifyError>;
}

/// Picks the transport from configuration. Never fails: misconfiguration
/// degrades to an `UnconfiguredNotifier`.
pub fn from_config(config: &Config) -> Arc<dyn Notifier> {
    match config.mail_transport {
        MailTransport::Log => {
            tracing::warn!("MAIL_TRANSPORT=log: emails are written to the log, not sent");
            Arc::new(LogNotifier)
        }
        MailTransport::Smtp => match &config.smtp {
            Some(smtp) => match SmtpNotifier::new(smtp, &config.mail_from, &config.frontend_url) {
                Ok(notifier) => Arc::new(notifier),
                Err(e) => {
                    tracing::warn!(error = %e, "SMTP transport misconfigured, email delivery disabled");
                    Arc::new(UnconfiguredNotifier)
                }
            },
            None => {
                tracing::warn!("SMTP_HOST not set, email delivery disabled");
                Arc::new(UnconfiguredNotifier)
            }
        },
    }
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    frontend_url: String,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig, from: &str, frontend_url: &str) -> Result<Self, NotifyError> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::Address(format!("MAIL_FROM: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            frontend_url: frontend_url.to_string(),
        })
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url, token)
    }

    async fn deliver(&self, to: &str, subject: &str, body: String) -> Result<(), NotifyError> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::Address(e.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_verification(&self, email: &str, code: &str, role: Role) -> Result<(), NotifyError> {
        let body = verification_body(code, role);
        self.deliver(email, "Verification code - Telemedecine", body).await?;
        tracing::info!(role = %role, "verification code sent");
        Ok(())
    }

    async fn send_reset_link(&self, email: &str, token: &str, role: Role) -> Result<(), NotifyError> {
        let body = reset_body(&self.reset_link(token), role);
        self.deliver(email, "Password reset - Telemedecine", body).await?;
        tracing::info!(role = %role, "password reset link sent");
        Ok(())
    }
}

/// Local development sender: logs the payload instead of delivering it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_verification(&self, email: &str, code: &str, role: Role) -> Result<(), NotifyError> {
        tracing::info!(to_email = %email, role = %role, code = %code, "verification email (log transport)");
        Ok(())
    }

    async fn send_reset_link(&self, email: &str, token: &str, role: Role) -> Result<(), NotifyError> {
        tracing::info!(to_email = %email, role = %role, token = %token, "password reset email (log transport)");
        Ok(())
    }
}

pub struct UnconfiguredNotifier;

#[async_trait]
impl Notifier for UnconfiguredNotifier {
    async fn send_verification(&self, _email: &str, _code: &str, _role: Role) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured)
    }

    async fn send_reset_link(&self, _email: &str, _token: &str, _role: Role) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured)
    }
}

fn verification_body(code: &str, role: Role) -> String {
    format!(
        "Hello,\n\n\
         You asked to create a {} account on Telemedecine.\n\n\
         Your verification code is: {code}\n\n\
         This code expires in 15 minutes. If you did not ask for it, ignore this email.\n",
        role.label()
    )
}

fn reset_body(link: &str, role: Role) -> String {
    format!(
        "Hello,\n\n\
         A password reset was requested for your {} account.\n\n\
         Open this link to choose a new password:\n{link}\n\n\
         The link expires in 1 hour. If you did not ask for it, ignore this email.\n",
        role.label()
    )
}
