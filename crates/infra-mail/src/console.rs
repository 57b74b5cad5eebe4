//! Console transport: logs emails instead of delivering them.

use async_trait::async_trait;
use contact_mailer_core::domain::EmailTask;
use contact_mailer_core::port::{MailTransport, TransportError};
use tracing::info;

/// Development transport. Every send succeeds.
#[derive(Debug, Clone, Default)]
pub struct ConsoleMailTransport;

impl ConsoleMailTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailTransport for ConsoleMailTransport {
    async fn send(&self, task: &EmailTask) -> Result<(), TransportError> {
        info!(
            from = %task.sender_address(),
            to = ?task.recipients(),
            subject = %task.subject(),
            body = %task.body(),
            "Console mail transport: email not delivered"
        );
        Ok(())
    }
}
