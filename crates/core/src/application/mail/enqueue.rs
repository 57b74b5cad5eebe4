// Enqueue Use Case

use crate::application::queue::EmailQueue;
use crate::domain::EmailTask;
use tracing::info;

/// Push a task onto the queue.
///
/// No validation and no delivery here. The queue is unbounded, so this
/// cannot fail and never waits on the worker or the transport.
pub fn execute(queue: &EmailQueue, task: EmailTask) {
    let recipients = task.recipients().to_vec();
    queue.push(task);
    info!(recipients = ?recipients, "Email queued");
}
