// Email Queue - unbounded FIFO shared by producers and the single worker

use crate::domain::EmailTask;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("mark_done called more times than tasks were queued")]
    MarkDoneWithoutTask,
}

// Stand-in deadline for timeouts too large to add to `Instant::now()`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE)
}

struct QueueState {
    tasks: VecDeque<EmailTask>,
    /// Tasks pushed but not yet acknowledged with `mark_done` (waiting + in flight)
    unfinished: usize,
}

/// Unbounded multi-producer / single-consumer FIFO of email tasks.
///
/// `push` is synchronous so request handlers can enqueue without awaiting.
/// The worker consumes with `pop`, which waits at most `timeout` so it can
/// re-check its stop flag between waits.
pub struct EmailQueue {
    state: Mutex<QueueState>,
    available: Notify,
    drained: Notify,
}

impl Default for EmailQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                unfinished: 0,
            }),
            available: Notify::new(),
            drained: Notify::new(),
        }
    }

    // The guarded data is a plain buffer and counter, so a poisoned lock is still consistent
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a task to the tail. Never waits for the consumer.
    pub fn push(&self, task: EmailTask) {
        {
            let mut state = self.lock();
            state.tasks.push_back(task);
            state.unfinished += 1;
        }
        // Stores a permit if the worker is between checks, so the wakeup is not lost
        self.available.notify_one();
    }

    /// Remove the head task, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `None` when nothing showed up in time. That is a normal idle
    /// signal, not an error.
    pub async fn pop(&self, timeout: Duration) -> Option<EmailTask> {
        let deadline = deadline_after(timeout);
        loop {
            let notified = self.available.notified();
            let next = self.lock().tasks.pop_front();
            if next.is_some() {
                return next;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                // Last look: a push may have raced the deadline
                return self.lock().tasks.pop_front();
            }
        }
    }

    /// Acknowledge that a popped task has been processed (successfully or not).
    pub fn mark_done(&self) -> Result<(), QueueError> {
        let now_drained = {
            let mut state = self.lock();
            if state.unfinished == 0 {
                return Err(QueueError::MarkDoneWithoutTask);
            }
            state.unfinished -= 1;
            state.unfinished == 0
        };
        if now_drained {
            self.drained.notify_waiters();
        }
        Ok(())
    }

    /// Number of tasks waiting to be popped
    pub fn pending(&self) -> usize {
        self.lock().tasks.len()
    }

    /// Number of tasks not yet acknowledged (waiting + in flight)
    pub fn unfinished(&self) -> usize {
        self.lock().unfinished
    }

    /// Queue empty and nothing in flight
    pub fn is_drained(&self) -> bool {
        self.unfinished() == 0
    }

    /// Wait until every queued task has been acknowledged.
    ///
    /// Returns `false` if the queue was still not drained after `timeout`.
    pub async fn wait_drained(&self, timeout: Duration) -> bool {
        let deadline = deadline_after(timeout);
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent mark_done cannot slip between
            notified.as_mut().enable();

            if self.is_drained() {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.is_drained();
            }
        }
    }
}
