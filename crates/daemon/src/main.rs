//! Contact Mailer - Main Entry Point
//! JSON-RPC contact form endpoint + background email worker

mod config;
mod logging;

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use config::{AppConfig, MailBackend};
use contact_mailer_api_rpc::{RpcServer, RpcServerConfig};
use contact_mailer_core::application::{EmailQueue, EmailWorker, MailService};
use contact_mailer_core::port::MailTransport;
use contact_mailer_infra_mail::{ConsoleMailTransport, SmtpMailTransport};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration (file + environment)
    let config = AppConfig::load()?;

    // 2. Initialize logging
    let _log_guard = logging::init(&config.log)?;

    info!("Contact Mailer v{} starting...", VERSION);

    // 3. Build the mail transport
    let transport = build_transport(&config)?;

    // 4. Queue shared by the RPC handlers (producers) and the worker (consumer)
    let queue = Arc::new(EmailQueue::new());
    let mail_service = MailService::new(Arc::clone(&queue));

    // 5. Start Worker
    info!("Starting email worker...");
    let worker = EmailWorker::new(Arc::clone(&queue), transport)
        .poll_timeout(config.worker.poll_timeout())
        .start();

    // 6. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        host: config.rpc.host.clone(),
        port: config.rpc.port,
    };
    let rpc_server = RpcServer::new(
        rpc_config,
        mail_service,
        config.contact.recipients.clone(),
        worker.monitor(),
    );
    let rpc = match rpc_server.start().await {
        Ok(rpc) => rpc,
        Err(e) => {
            let _ = worker.shutdown(config.worker.join_timeout()).await;
            return Err(anyhow::anyhow!("RPC server start failed: {}", e));
        }
    };

    info!(
        local_addr = %rpc.local_addr,
        recipients = ?config.contact.recipients,
        "System ready. Waiting for contact submissions..."
    );
    info!("Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown: stop accepting, optionally drain, then stop the worker
    rpc.handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc.handle.stopped().await;

    if let Some(drain_timeout) = config.worker.drain_timeout() {
        info!(pending = queue.unfinished(), "Waiting for email queue to drain...");
        if !queue.wait_drained(drain_timeout).await {
            warn!(
                pending = queue.unfinished(),
                "Email queue not drained before timeout, remaining emails are dropped"
            );
        }
    }

    if let Err(e) = worker.shutdown(config.worker.join_timeout()).await {
        warn!(error = %e, "Email worker did not stop cleanly");
    }

    info!("Shutdown complete.");

    Ok(())
}

fn build_transport(config: &AppConfig) -> Result<Arc<dyn MailTransport>> {
    match config.mail.backend {
        MailBackend::Console => {
            warn!("Using console mail transport: emails are logged, not delivered");
            Ok(Arc::new(ConsoleMailTransport::new()))
        }
        MailBackend::Smtp => {
            let smtp = config
                .smtp
                .clone()
                .ok_or_else(|| anyhow::anyhow!("SMTP backend selected without [smtp] config"))?;
            info!(host = %smtp.host, port = smtp.port, tls = ?smtp.tls, "Using SMTP mail transport");
            let transport = SmtpMailTransport::from_config(smtp)
                .map_err(|e| anyhow::anyhow!("SMTP transport setup failed: {}", e))?;
            Ok(Arc::new(transport))
        }
    }
}
