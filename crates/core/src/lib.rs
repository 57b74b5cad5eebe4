// Contact Mailer Core - Queue, Worker & Ports
// NO infrastructure dependencies (SMTP and RPC live in adapter crates)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
