// Mail Transport Port
// Abstraction over whatever actually delivers an email (SMTP, console, ...)

use crate::domain::EmailTask;
use async_trait::async_trait;
use thiserror::Error;

/// Transport failures
///
/// Every variant is non-fatal to the worker: it is logged and the task is dropped.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

/// Mail Transport trait
///
/// Implementations:
/// - SmtpMailTransport: delivers through an SMTP relay
/// - ConsoleMailTransport: logs the email instead of sending it
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send one email. Called exactly once per queued task.
    ///
    /// # Errors
    /// - TransportError::InvalidAddress if the sender or a recipient does not parse
    /// - TransportError::Delivery if the mail system rejects the message
    async fn send(&self, task: &EmailTask) -> Result<(), TransportError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock transport behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Always fail with message
        Fail(String),
        /// Fail only for tasks addressed to this recipient
        FailFor(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
        /// Succeed after sleeping
        Delay(Duration),
    }

    /// Mock Mail Transport for testing
    ///
    /// Records every task it is asked to send, in call order.
    #[derive(Clone)]
    pub struct MockMailTransport {
        behavior: Arc<Mutex<MockBehavior>>,
        sent: Arc<Mutex<Vec<EmailTask>>>,
    }

    impl MockMailTransport {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }
        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }
        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }
        pub fn new_fail_for(recipient: impl Into<String>) -> Self {
            Self::new(MockBehavior::FailFor(recipient.into()))
        }
        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }
        pub fn new_delayed(delay: Duration) -> Self {
            Self::new(MockBehavior::Delay(delay))
        }
        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }
        pub fn call_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
        pub fn sent(&self) -> Vec<EmailTask> {
            self.sent.lock().unwrap().clone()
        }
        pub fn sent_subjects(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|task| task.subject().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl MailTransport for MockMailTransport {
        async fn send(&self, task: &EmailTask) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(task.clone());

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::Fail(msg) => Err(TransportError::Delivery(msg)),
                MockBehavior::FailFor(recipient) => {
                    if task.recipients().contains(&recipient) {
                        Err(TransportError::InvalidAddress(recipient))
                    } else {
                        Ok(())
                    }
                }
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
                MockBehavior::Delay(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(())
                }
            }
        }
    }
}
