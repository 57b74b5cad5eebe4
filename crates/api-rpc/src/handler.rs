//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::to_rpc_error;
use crate::types::{
    ContactSubmitRequest, ContactSubmitResponse, HealthResponse, StatsResponse,
};
use contact_mailer_core::application::{MailService, WorkerMonitor};
use contact_mailer_core::domain::ContactSubmission;
use contact_mailer_core::error::AppError;
use jsonrpsee::types::ErrorObjectOwned;

pub const SERVICE_NAME: &str = "contact-mailer";

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    mail_service: MailService,
    recipients: Vec<String>,
    worker: WorkerMonitor,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(mail_service: MailService, recipients: Vec<String>, worker: WorkerMonitor) -> Self {
        Self {
            mail_service,
            recipients,
            worker,
            start_time: std::time::Instant::now(),
        }
    }

    /// contact.submit.v1
    ///
    /// Replies as soon as the email is queued. Delivery happens later on the
    /// worker and its outcome is never reported back to the submitter.
    pub fn submit_contact(
        &self,
        params: ContactSubmitRequest,
    ) -> Result<ContactSubmitResponse, ErrorObjectOwned> {
        let submission = ContactSubmission::new(params.name, params.email, params.message);
        submission
            .validate()
            .map_err(|e| to_rpc_error(AppError::from(e)))?;

        self.mail_service
            .enqueue(submission.into_task(self.recipients.clone()));

        Ok(ContactSubmitResponse {
            status: "success".to_string(),
            message: "Email queued for delivery".to_string(),
        })
    }

    /// health.check.v1
    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
        }
    }

    /// admin.stats.v1
    pub fn stats(&self) -> StatsResponse {
        let queue = self.mail_service.queue();
        let stats = self.worker.stats();

        StatsResponse {
            pending: queue.pending() as u64,
            unfinished: queue.unfinished() as u64,
            worker_state: self.worker.state().to_string(),
            sent: stats.sent,
            failed: stats.failed,
            internal_errors: stats.internal_errors,
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}
