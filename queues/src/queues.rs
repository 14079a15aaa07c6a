use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use internals::{QueueError, QueueMessage};
use tokio::sync::Notify;
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::acks::{AckStatus, InFlight, PendingMessage};
use crate::{check_batch_size, MessageQueue};

const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

/// Process-local queue with at-least-once delivery.
///
/// Received messages stay hidden for the visibility timeout. If they are not
/// deleted in time they go back to the ready buffer and are handed out again
/// with the same message id and a fresh receipt handle.
pub struct InMemoryQueue {
    pub name: String,
    ready: Mutex<VecDeque<PendingMessage>>,
    in_flight: InFlight,
    visibility_timeout: Duration,
    notify: Notify,
}

impl InMemoryQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_visibility_timeout(name, DEFAULT_VISIBILITY_TIMEOUT)
    }

    pub fn with_visibility_timeout(name: impl Into<String>, visibility_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            ready: Mutex::new(VecDeque::new()),
            in_flight: InFlight::new(),
            visibility_timeout,
            notify: Notify::new(),
        }
    }

    fn ready(&self) -> Result<MutexGuard<'_, VecDeque<PendingMessage>>, QueueError> {
        self.ready.lock().map_err(|e| {
            error!(error=%e, "queue is unavailable");
            QueueError::Receive("queue is unavailable".to_string())
        })
    }

    /// Enqueues a body and returns the id it will be delivered under.
    #[instrument(skip_all, fields(queue_name=%self.name))]
    pub fn send(&self, body: impl Into<String>) -> Result<String, QueueError> {
        let message_id = Uuid::new_v4().to_string();
        self.ready()?.push_back(PendingMessage {
            message_id: message_id.clone(),
            body: body.into(),
            receive_count: 0,
        });
        debug!(message_id=%message_id, "message enqueued");

        self.notify.notify_waiters();
        Ok(message_id)
    }

    /// Messages waiting to be received, not counting in-flight ones.
    pub fn len(&self) -> Result<usize, QueueError> {
        Ok(self.ready()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.ready()?.is_empty())
    }

    /// Messages received but neither deleted nor expired yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn requeue_expired(&self) -> Result<(), QueueError> {
        let expired = self.in_flight.take_expired();
        if expired.is_empty() {
            return Ok(());
        }

        info!(count = expired.len(), "visibility timeout expired, requeueing");
        let mut ready = self.ready()?;
        for message in expired {
            ready.push_back(message);
        }
        Ok(())
    }

    fn take_batch(&self, max_messages: usize) -> Result<Vec<QueueMessage>, QueueError> {
        let mut ready = self.ready()?;
        let count = max_messages.min(ready.len());

        Ok(ready
            .drain(..count)
            .map(|mut message| {
                message.receive_count += 1;
                debug!(
                    message_id=%message.message_id,
                    receive_count = message.receive_count,
                    "delivering message"
                );
                let message_id = message.message_id.clone();
                let body = message.body.clone();
                let receipt_handle = self.in_flight.add_record(message, self.visibility_timeout);
                QueueMessage {
                    message_id,
                    receipt_handle,
                    body,
                }
            })
            .collect())
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    #[instrument(skip_all, fields(queue_name=%self.name, max_messages=%max_messages, wait=?wait))]
    async fn receive(
        &self,
        max_messages: i32,
        wait: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        check_batch_size(max_messages)?;
        let deadline = Instant::now() + wait;

        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // register before looking at the buffer so a concurrent send is not missed
            notified.as_mut().enable();

            self.requeue_expired()?;
            let batch = self.take_batch(max_messages as usize)?;
            if !batch.is_empty() {
                debug!(count = batch.len(), "batch received");
                return Ok(batch);
            }

            if Instant::now() >= deadline {
                return Ok(Vec::new());
            }

            let wake_at = self
                .in_flight
                .next_deadline()
                .map_or(deadline, |next| next.min(deadline));
            let _ = tokio::time::timeout_at(wake_at, notified).await;
        }
    }

    #[instrument(skip_all, fields(queue_name=%self.name))]
    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.in_flight.apply_ack(receipt_handle).map_err(|status| {
            warn!(status=?status, "delete rejected");
            match status {
                AckStatus::DeadlineExceeded => {
                    QueueError::Delete("receipt handle has expired".to_string())
                }
                AckStatus::ReceiptNotFound => {
                    QueueError::Delete("receipt handle not found".to_string())
                }
            }
        })
    }
}
