//! Outbound mail transport

use super::message::OutboundMessage;
use crate::config::SmtpSettings;
use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAck {
    pub code: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}

/// A single capability: deliver one message with the given settings.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(
        &self,
        settings: &SmtpSettings,
        message: OutboundMessage,
    ) -> Result<DeliveryAck, TransportError>;
}

/// SMTP delivery through lettre. A fresh connection is opened per send.
#[derive(Debug, Clone, Default)]
pub struct SmtpMailTransport;

impl SmtpMailTransport {
    pub fn new() -> Self {
        Self
    }

    fn build_message(message: OutboundMessage) -> Result<Message, TransportError> {
        let from_address: Address = parse_address(&message.from_address)?;
        let from = Mailbox::new(Some(message.from_name), from_address);
        let to = Mailbox::new(None, parse_address(&message.to)?);
        let reply_to = Mailbox::new(None, parse_address(&message.reply_to)?);

        Message::builder()
            .from(from)
            .to(to)
            .reply_to(reply_to)
            .subject(message.subject)
            .multipart(MultiPart::alternative_plain_html(message.text, message.html))
            .map_err(|e| TransportError::Build(e.to_string()))
    }

    fn build_transport(
        settings: &SmtpSettings,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, TransportError> {
        let builder = if settings.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| TransportError::Smtp(e.to_string()))?;

        Ok(builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(settings.timeout_seconds)))
            .build())
    }
}

fn parse_address(raw: &str) -> Result<Address, TransportError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| TransportError::InvalidAddress(format!("{}: {}", raw, e)))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(
        &self,
        settings: &SmtpSettings,
        message: OutboundMessage,
    ) -> Result<DeliveryAck, TransportError> {
        let email = Self::build_message(message)?;
        let mailer = Self::build_transport(settings)?;

        debug!(
            host = %settings.host,
            port = settings.port,
            implicit_tls = settings.implicit_tls(),
            "Opening SMTP connection"
        );

        let response = mailer
            .send(email)
            .await
            .map_err(|e| TransportError::Smtp(e.to_string()))?;

        Ok(DeliveryAck {
            code: response.code().to_string(),
        })
    }
}
