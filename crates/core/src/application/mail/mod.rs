// Mail Service - the Enqueue API used by request handlers

pub mod enqueue;

use crate::application::queue::EmailQueue;
use crate::domain::EmailTask;
use std::sync::Arc;

/// Producer-side handle onto the email queue.
///
/// Constructed once at startup and cloned into every request handler. The
/// worker holds the other end of the same queue.
#[derive(Clone)]
pub struct MailService {
    queue: Arc<EmailQueue>,
}

impl MailService {
    pub fn new(queue: Arc<EmailQueue>) -> Self {
        Self { queue }
    }

    /// Queue an email for background delivery and return immediately
    pub fn queue_email(
        &self,
        subject: impl Into<String>,
        body: impl Into<String>,
        sender_address: impl Into<String>,
        recipients: Vec<String>,
    ) {
        let task = EmailTask::new(subject, body, sender_address, recipients);
        enqueue::execute(&self.queue, task);
    }

    /// Queue an already-built task
    pub fn enqueue(&self, task: EmailTask) {
        enqueue::execute(&self.queue, task);
    }

    pub fn queue(&self) -> &Arc<EmailQueue> {
        &self.queue
    }
}
