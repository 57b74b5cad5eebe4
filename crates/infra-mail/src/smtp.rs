//! SMTP transport built on lettre.

use std::time::Duration;

use async_trait::async_trait;
use contact_mailer_core::domain::EmailTask;
use contact_mailer_core::port::{MailTransport, TransportError};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use tracing::debug;

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain connection upgraded with STARTTLS
    #[default]
    Starttls,
    /// Implicit TLS (usually port 465)
    Tls,
    /// No encryption. Local relays and tests only.
    None,
}

/// Configuration for the SMTP transport.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub host: String,

    /// SMTP server port (default: 587).
    #[serde(default = "default_port")]
    pub port: u16,

    /// SMTP username for authentication.
    #[serde(default)]
    pub username: Option<String>,

    /// SMTP password for authentication.
    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub tls: TlsMode,

    /// Connection timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    587
}

fn default_timeout() -> u64 {
    10
}

/// SMTP-based transport using lettre.
#[derive(Clone)]
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Build the transport. No connection is opened until the first send.
    pub fn from_config(config: SmtpConfig) -> Result<Self, TransportError> {
        let mut builder = match config.tls {
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| TransportError::Unavailable(e.to_string()))?,
            TlsMode::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| TransportError::Unavailable(e.to_string()))?,
        };

        builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        if let (Some(username), Some(password)) = (config.username, config.password) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    /// Build a plain-text lettre Message from a task.
    pub fn build_message(task: &EmailTask) -> Result<Message, TransportError> {
        let from: Mailbox = parse_mailbox(task.sender_address())?;

        let mut builder = Message::builder().from(from);
        for to in task.recipients() {
            builder = builder.to(parse_mailbox(to)?);
        }

        builder
            .subject(task.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(task.body().to_string())
            .map_err(|e| TransportError::Build(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address
        .parse()
        .map_err(|_| TransportError::InvalidAddress(address.to_string()))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, task: &EmailTask) -> Result<(), TransportError> {
        let message = Self::build_message(task)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| TransportError::Delivery(e.to_string()))?;

        debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}
