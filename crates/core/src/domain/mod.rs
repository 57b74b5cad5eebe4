// Domain Layer - Pure value objects

pub mod contact;
pub mod error;
pub mod task;

// Re-exports
pub use contact::ContactSubmission;
pub use error::DomainError;
pub use task::EmailTask;
