// Contact Mailer - Mail Transport Adapters
// Implements the core MailTransport port

pub mod console;
pub mod smtp;

pub use console::ConsoleMailTransport;
pub use smtp::{SmtpConfig, SmtpMailTransport, TlsMode};
