// Port Layer - Interfaces for external dependencies

pub mod mail_transport;

// Re-exports
pub use mail_transport::{MailTransport, TransportError};
