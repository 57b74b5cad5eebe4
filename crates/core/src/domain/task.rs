// Email Task Domain Model

/// One email waiting to be handed to the transport.
///
/// Immutable once built. The queue never looks inside it and no validation
/// happens here: the transport is the final judge of whether the addresses
/// are deliverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTask {
    subject: String,
    body: String,
    sender_address: String,
    recipients: Vec<String>,
}

impl EmailTask {
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        sender_address: impl Into<String>,
        recipients: Vec<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            sender_address: sender_address.into(),
            recipients,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn sender_address(&self) -> &str {
        &self.sender_address
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }
}
