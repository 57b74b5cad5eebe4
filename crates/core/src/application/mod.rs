// Application Layer - Queue, Enqueue API and Worker

pub mod mail;
pub mod queue;
pub mod worker;

// Re-exports
pub use mail::MailService;
pub use queue::{EmailQueue, QueueError};
pub use worker::{
    shutdown_channel, EmailWorker, ShutdownSender, ShutdownToken, WorkerHandle, WorkerMonitor,
    WorkerState, WorkerStats, WorkerStatsSnapshot,
};
