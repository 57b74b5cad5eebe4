//! Worker Scenario Tests
//!
//! Drives the enqueue API, queue and worker together against a mock transport.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use contact_mailer_core::application::{
    EmailQueue, EmailWorker, MailService, WorkerHandle, WorkerState,
};
use contact_mailer_core::domain::ContactSubmission;
use contact_mailer_core::port::mail_transport::mocks::{MockBehavior, MockMailTransport};
use common::LogCapture;
use tokio_test::assert_ok;
use tracing::Level;

const FAST_POLL: Duration = Duration::from_millis(50);
const WAIT: Duration = Duration::from_secs(5);

fn start(
    transport: &MockMailTransport,
    poll: Duration,
) -> (MailService, Arc<EmailQueue>, WorkerHandle) {
    let queue = Arc::new(EmailQueue::new());
    let handle = EmailWorker::new(Arc::clone(&queue), Arc::new(transport.clone()))
        .poll_timeout(poll)
        .start();
    (MailService::new(Arc::clone(&queue)), queue, handle)
}

fn queue_numbered(service: &MailService, i: usize) {
    service.queue_email(
        format!("message-{}", i),
        "body",
        "visitor@example.com",
        vec![format!("team{}@example.com", i)],
    );
}

/// Scenario A: one contact submission is delivered with matching fields
#[tokio::test]
async fn test_contact_submission_is_delivered() {
    let (logs, _guard) = LogCapture::install();
    let transport = MockMailTransport::new_success();
    let (service, queue, worker) = start(&transport, FAST_POLL);

    let task = ContactSubmission::new("Alice", "alice@example.com", "Hello!")
        .into_task(vec!["team@example.com".to_string()]);
    service.queue_email(
        task.subject(),
        task.body(),
        task.sender_address(),
        task.recipients().to_vec(),
    );

    assert!(queue.wait_drained(WAIT).await);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], task);
    assert_eq!(sent[0].subject(), "New Contact Form Submission from Alice");
    assert_eq!(sent[0].recipients(), ["team@example.com"]);

    let stats = worker.monitor().stats();
    assert_eq!(stats.sent, 1);
    assert_eq!(stats.failed, 0);

    let queued = logs.matching(Level::INFO, "Email queued");
    assert_eq!(queued.len(), 1);
    assert!(queued[0].field("recipients").contains("team@example.com"));

    let delivered = logs.matching(Level::INFO, "Email sent successfully");
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].field("recipients").contains("team@example.com"));
    assert!(logs.with_message("Failed to send email").is_empty());

    assert_ok!(worker.shutdown(WAIT).await);
}

/// Scenario B: every send fails, every task is still attempted
#[tokio::test]
async fn test_failing_transport_does_not_stop_worker() {
    let (logs, _guard) = LogCapture::install();
    let transport = MockMailTransport::new_fail("smtp: 421 service not available");
    let (service, queue, worker) = start(&transport, FAST_POLL);

    for i in 0..3 {
        queue_numbered(&service, i);
    }

    assert!(queue.wait_drained(WAIT).await);
    assert_eq!(transport.call_count(), 3);

    let stats = worker.monitor().stats();
    assert_eq!(stats.failed, 3);
    assert_eq!(stats.sent, 0);
    assert_eq!(stats.internal_errors, 0);
    assert_eq!(worker.state(), WorkerState::Running);

    assert_eq!(logs.matching(Level::INFO, "Email queued").len(), 3);
    let failures = logs.matching(Level::ERROR, "Failed to send email");
    assert_eq!(failures.len(), 3);
    for (i, record) in failures.iter().enumerate() {
        assert!(record.field("recipients").contains(&format!("team{}@example.com", i)));
        assert!(record.field("error").contains("421 service not available"));
    }
    assert!(logs.with_message("Email sent successfully").is_empty());

    assert_ok!(worker.shutdown(WAIT).await);
}

/// A panicking transport is one loop error record, and the worker keeps going
#[tokio::test]
async fn test_transport_panic_is_logged_once_and_worker_continues() {
    let (logs, _guard) = LogCapture::install();
    let transport = MockMailTransport::new_panic_inducing("transport exploded");
    let (service, queue, worker) = start(&transport, FAST_POLL);

    queue_numbered(&service, 0);
    assert!(queue.wait_drained(WAIT).await);

    transport.set_behavior(MockBehavior::Success);
    queue_numbered(&service, 1);
    assert!(queue.wait_drained(WAIT).await);

    let loop_errors = logs.matching(Level::ERROR, "Email worker error");
    assert_eq!(loop_errors.len(), 1);
    assert!(loop_errors[0].field("error").contains("transport exploded"));
    assert!(loop_errors[0].field("error").contains("team0@example.com"));

    let delivered = logs.matching(Level::INFO, "Email sent successfully");
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].field("recipients").contains("team1@example.com"));

    let stats = worker.monitor().stats();
    assert_eq!(stats.internal_errors, 1);
    assert_eq!(stats.sent, 1);
    assert_eq!(worker.state(), WorkerState::Running);

    assert_ok!(worker.shutdown(WAIT).await);
}

/// Scenario C: stopping an idle worker makes no transport calls
#[tokio::test]
async fn test_stop_idle_worker_within_poll_interval() {
    let transport = MockMailTransport::new_success();
    // Default one-second poll
    let (_service, _queue, worker) = start(&transport, Duration::from_secs(1));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let stop_requested = Instant::now();
    worker.stop();

    assert!(
        worker
            .wait_for_state(WorkerState::Stopped, Duration::from_millis(1500))
            .await
    );
    assert!(stop_requested.elapsed() <= Duration::from_millis(1500));
    assert_eq!(transport.call_count(), 0);

    assert_ok!(worker.join(WAIT).await);
}

#[tokio::test]
async fn test_delivery_order_matches_enqueue_order() {
    let transport = MockMailTransport::new_success();
    let (service, queue, worker) = start(&transport, FAST_POLL);

    for i in 0..50 {
        queue_numbered(&service, i);
    }
    assert!(queue.wait_drained(WAIT).await);

    let expected: Vec<String> = (0..50).map(|i| format!("message-{}", i)).collect();
    assert_eq!(transport.sent_subjects(), expected);

    assert_ok!(worker.shutdown(WAIT).await);
}

#[tokio::test]
async fn test_one_bad_message_does_not_block_the_rest() {
    let transport = MockMailTransport::new_fail_for("team2@example.com");
    let (service, queue, worker) = start(&transport, FAST_POLL);

    for i in 0..5 {
        queue_numbered(&service, i);
    }
    assert!(queue.wait_drained(WAIT).await);

    assert_eq!(transport.call_count(), 5);
    let stats = worker.monitor().stats();
    assert_eq!(stats.sent, 4);
    assert_eq!(stats.failed, 1);
    assert_eq!(worker.state(), WorkerState::Running);

    assert_ok!(worker.shutdown(WAIT).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_no_loss_no_duplication() {
    const PRODUCERS: usize = 8;
    const PER_PRODUCER: usize = 25;

    let transport = MockMailTransport::new_success();
    let (service, queue, worker) = start(&transport, FAST_POLL);

    let mut producers = Vec::new();
    for p in 0..PRODUCERS {
        let service = service.clone();
        producers.push(tokio::spawn(async move {
            for i in 0..PER_PRODUCER {
                service.queue_email(
                    format!("{}-{}", p, i),
                    "body",
                    "visitor@example.com",
                    vec!["team@example.com".to_string()],
                );
                tokio::task::yield_now().await;
            }
        }));
    }
    for producer in producers {
        producer.await.unwrap();
    }

    assert!(queue.wait_drained(WAIT).await);

    let subjects = transport.sent_subjects();
    assert_eq!(subjects.len(), PRODUCERS * PER_PRODUCER);
    let unique: HashSet<&String> = subjects.iter().collect();
    assert_eq!(unique.len(), PRODUCERS * PER_PRODUCER);

    // Each producer's own messages keep their relative order
    for p in 0..PRODUCERS {
        let prefix = format!("{}-", p);
        let mine: Vec<&String> = subjects.iter().filter(|s| s.starts_with(&prefix)).collect();
        let expected: Vec<String> = (0..PER_PRODUCER).map(|i| format!("{}-{}", p, i)).collect();
        assert_eq!(mine, expected.iter().collect::<Vec<_>>());
    }

    assert_ok!(worker.shutdown(WAIT).await);
}

#[tokio::test]
async fn test_enqueue_does_not_wait_for_slow_transport() {
    let transport = MockMailTransport::new_delayed(Duration::from_millis(300));
    let (service, queue, worker) = start(&transport, FAST_POLL);

    let started = Instant::now();
    for i in 0..5 {
        queue_numbered(&service, i);
    }
    assert!(started.elapsed() < Duration::from_millis(100));

    // Delivery is still in progress
    assert!(!queue.is_drained());

    worker.stop();
    assert_ok!(worker.join(WAIT).await);
}

#[tokio::test]
async fn test_stop_waits_for_in_flight_send() {
    let transport = MockMailTransport::new_delayed(Duration::from_millis(300));
    let (service, queue, worker) = start(&transport, FAST_POLL);

    queue_numbered(&service, 0);
    queue_numbered(&service, 1);
    while transport.call_count() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let stop_requested = Instant::now();
    worker.stop();
    assert_eq!(worker.state(), WorkerState::Stopping);

    assert!(
        worker
            .wait_for_state(WorkerState::Stopped, Duration::from_secs(2))
            .await
    );
    // Bounded by one send plus one poll interval
    let bound = Duration::from_millis(300) + FAST_POLL + Duration::from_millis(500);
    assert!(stop_requested.elapsed() < bound);

    // The in-flight task was acknowledged, the second one is still queued
    assert_eq!(worker.monitor().stats().sent, 1);
    assert_eq!(queue.pending(), 1);
    assert_eq!(queue.unfinished(), 1);

    assert_ok!(worker.join(WAIT).await);
}
