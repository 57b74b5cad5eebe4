//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 server in front of the email queue:
//! contact form submission, health check and queue/worker stats.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig, StartedServer};
