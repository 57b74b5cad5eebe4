// Contact Form Submission

use super::error::{DomainError, Result};
use super::task::EmailTask;

/// A contact form as submitted by a site visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactSubmission {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Reject submissions with a missing field.
    ///
    /// Only presence is checked; address syntax is left to the transport.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::Validation(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }

    pub fn subject(&self) -> String {
        format!("New Contact Form Submission from {}", self.name)
    }

    pub fn body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\nMessage: {}",
            self.name, self.email, self.message
        )
    }

    /// Build the notification email. The visitor's address becomes the sender.
    pub fn into_task(self, recipients: Vec<String>) -> EmailTask {
        let subject = self.subject();
        let body = self.body();
        EmailTask::new(subject, body, self.email, recipients)
    }
}
