//! Queue side of the relay.
//!
//! [`MessageQueue`] is the seam the relay consumes: receive a bounded batch
//! with a long-poll wait, and delete a single delivery by its receipt handle.
//! Redelivery of anything not deleted is left entirely to the queue
//! implementation (visibility timeout), the relay never re-enqueues.

mod acks;
pub mod queues;
pub mod sqs;

use std::time::Duration;

use async_trait::async_trait;
use internals::{QueueError, QueueMessage};

pub use queues::InMemoryQueue;
pub use sqs::SqsQueue;

/// SQS refuses batches larger than this.
pub const MAX_BATCH_SIZE: i32 = 10;

/// SQS refuses long-poll waits longer than this.
pub const MAX_WAIT_TIME: Duration = Duration::from_secs(20);

#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Pulls up to `max_messages` deliveries, waiting at most `wait` for the
    /// first one. An empty batch is a normal result, not an error.
    async fn receive(
        &self,
        max_messages: i32,
        wait: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError>;

    /// Removes one delivery from the queue for good.
    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError>;
}

pub(crate) fn check_batch_size(max_messages: i32) -> Result<(), QueueError> {
    if !(1..=MAX_BATCH_SIZE).contains(&max_messages) {
        return Err(QueueError::Receive(format!(
            "max_messages must be between 1 and {}, got {}",
            MAX_BATCH_SIZE, max_messages
        )));
    }
    Ok(())
}
