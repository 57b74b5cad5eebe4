//! JSON-RPC Server
//!
//! Serves JSON-RPC 2.0 over HTTP.

use crate::handler::RpcHandler;
use crate::types::ContactSubmitRequest;
use contact_mailer_core::application::{MailService, WorkerMonitor};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// A running server and the address it actually bound (port 0 resolves here)
pub struct StartedServer {
    pub handle: ServerHandle,
    pub local_addr: SocketAddr,
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        mail_service: MailService,
        recipients: Vec<String>,
        worker: WorkerMonitor,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(mail_service, recipients, worker)),
        }
    }

    /// Start the JSON-RPC server
    pub async fn start(self) -> Result<StartedServer, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let mut module = RpcModule::new(());

        // Register methods
        let handler = self.handler.clone();
        module
            .register_async_method("contact.submit.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ContactSubmitRequest = params.parse()?;
                    handler.submit_contact(req)
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("health.check.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { Ok::<_, ErrorObjectOwned>(handler.health()) }
            })
            .map_err(|e| e.to_string())?;

        // Admin APIs
        let handler = self.handler.clone();
        module
            .register_async_method("admin.stats.v1", move |_, _, _| {
                let handler = handler.clone();
                async move { Ok::<_, ErrorObjectOwned>(handler.stats()) }
            })
            .map_err(|e| e.to_string())?;

        info!(local_addr = %local_addr, "JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok(StartedServer { handle, local_addr })
    }
}
