// Worker - single background consumer of the email queue

pub mod constants;
mod panic_guard;
mod shutdown;
mod state;

use constants::*;
pub use panic_guard::{describe_join_error, panic_message};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use state::{WorkerState, WorkerStats, WorkerStatsSnapshot};

use crate::application::queue::EmailQueue;
use crate::domain::EmailTask;
use crate::error::{AppError, Result};
use crate::port::MailTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Drains the email queue and hands each task to the transport, one at a time.
///
/// A transport failure is logged and the task is dropped (no retry). Any
/// other error inside the loop is logged and the loop keeps going; only the
/// stop flag ends it.
pub struct EmailWorker {
    queue: Arc<EmailQueue>,
    transport: Arc<dyn MailTransport>,
    poll_timeout: Duration,
    state: Arc<watch::Sender<WorkerState>>,
    stats: Arc<WorkerStats>,
}

impl EmailWorker {
    pub fn new(queue: Arc<EmailQueue>, transport: Arc<dyn MailTransport>) -> Self {
        let (state, _) = watch::channel(WorkerState::Created);
        Self {
            queue,
            transport,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            state: Arc::new(state),
            stats: Arc::new(WorkerStats::default()),
        }
    }

    /// How long each pop waits before re-checking the stop flag (default: 1s)
    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    pub fn monitor(&self) -> WorkerMonitor {
        WorkerMonitor {
            state: self.state.subscribe(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Spawn the worker loop on its own tokio task.
    ///
    /// Consumes the worker, so it can only be started once.
    pub fn start(self) -> WorkerHandle {
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        self.state.send_replace(WorkerState::Running);

        let state = Arc::clone(&self.state);
        let monitor = self.monitor();
        let join = tokio::spawn(async move {
            self.run(shutdown_rx).await;
        });

        WorkerHandle {
            shutdown: shutdown_tx,
            state,
            monitor,
            join,
        }
    }

    /// Run worker loop until the stop flag is observed
    pub async fn run(&self, shutdown: ShutdownToken) {
        self.state.send_if_modified(|state| {
            if *state == WorkerState::Created {
                *state = WorkerState::Running;
                true
            } else {
                false
            }
        });
        info!(poll_timeout_ms = %self.poll_timeout.as_millis(), "Email worker started");

        loop {
            if shutdown.is_shutdown() {
                break;
            }
            if let Err(e) = self.process_next().await {
                self.stats.record_internal_error();
                error!(error = %e, "Email worker error");
            }
        }

        self.state.send_replace(WorkerState::Stopped);
        let stats = self.stats.snapshot();
        info!(
            sent = stats.sent,
            failed = stats.failed,
            remaining = self.queue.pending(),
            "Email worker stopped"
        );
    }

    /// Process next task from the queue (returns true if a task was processed)
    pub async fn process_next(&self) -> Result<bool> {
        let Some(task) = self.queue.pop(self.poll_timeout).await else {
            return Ok(false);
        };

        let dispatched = self.dispatch(task).await;
        // Acknowledge whatever the outcome, so drain waiters are not stuck
        let done = self.queue.mark_done();

        dispatched?;
        done?;
        Ok(true)
    }

    /// Send one task. Transport failures are handled here; only defects escape.
    async fn dispatch(&self, task: EmailTask) -> Result<()> {
        let recipients = task.recipients().to_vec();
        let transport = Arc::clone(&self.transport);

        // Separate task so a panicking transport cannot take the loop down with it
        let handle = tokio::spawn(async move { transport.send(&task).await });

        match handle.await {
            Ok(Ok(())) => {
                self.stats.record_sent();
                info!(recipients = ?recipients, "Email sent successfully");
                Ok(())
            }
            Ok(Err(e)) => {
                self.stats.record_failed();
                error!(recipients = ?recipients, error = %e, "Failed to send email");
                Ok(())
            }
            Err(join_err) => Err(AppError::Internal(format!(
                "transport call for {:?} {}",
                recipients,
                describe_join_error(join_err)
            ))),
        }
    }
}

/// Read-only view of a worker's state and counters
#[derive(Clone)]
pub struct WorkerMonitor {
    state: watch::Receiver<WorkerState>,
    stats: Arc<WorkerStats>,
}

impl WorkerMonitor {
    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    pub fn stats(&self) -> WorkerStatsSnapshot {
        self.stats.snapshot()
    }

    /// Wait until the worker reaches `target`. Returns false on timeout.
    pub async fn wait_for_state(&self, target: WorkerState, timeout: Duration) -> bool {
        let mut rx = self.state.clone();
        let reached = matches!(
            tokio::time::timeout(timeout, rx.wait_for(|state| *state == target)).await,
            Ok(Ok(_))
        );
        reached
    }
}

/// Lifecycle handle for a started worker
pub struct WorkerHandle {
    shutdown: ShutdownSender,
    state: Arc<watch::Sender<WorkerState>>,
    monitor: WorkerMonitor,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Request graceful stop.
    ///
    /// Idempotent. Does not interrupt an in-flight send and does not drain
    /// the queue: tasks still waiting stay queued.
    pub fn stop(&self) {
        if !self.shutdown.shutdown() {
            return;
        }
        self.state.send_if_modified(|state| {
            if *state == WorkerState::Running {
                *state = WorkerState::Stopping;
                true
            } else {
                false
            }
        });
        info!("Email worker stop requested");
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    pub fn monitor(&self) -> WorkerMonitor {
        self.monitor.clone()
    }

    pub async fn wait_for_state(&self, target: WorkerState, timeout: Duration) -> bool {
        self.monitor.wait_for_state(target, timeout).await
    }

    /// Wait for the worker task to finish, giving up after `timeout`
    pub async fn join(self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.join).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(join_err)) => Err(AppError::Internal(format!(
                "worker task {}",
                describe_join_error(join_err)
            ))),
            Err(_) => Err(AppError::Timeout(format!(
                "worker did not stop within {:?}",
                timeout
            ))),
        }
    }

    /// `stop` followed by a bounded `join`
    pub async fn shutdown(self, timeout: Duration) -> Result<()> {
        self.stop();
        self.join(timeout).await
    }
}
