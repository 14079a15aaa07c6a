//! Relay - moves messages from a queue into an object store
//!
//! Each cycle receives one bounded batch, then for every message in turn
//! parses its body, derives a `YYYY/MM/DD/<message_id>.json` key from the
//! embedded `date`, writes the body under that key and only then deletes the
//! message from the queue.
//!
//! Messages that cannot be parsed are skipped and left on the queue. Getting
//! them back (or giving up on them) is the queue's visibility timeout and
//! redrive policy, not something the relay controls. Any receive, write or
//! delete failure aborts the cycle and is returned to the caller, who is
//! expected to retry the whole cycle.

pub mod aws;
pub mod config;
mod date;
mod processor;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use internals::{QueueMessage, RelayError};
use queues::MessageQueue;
use serde::Serialize;
use storage::ObjectStore;
use tracing::{error, info, instrument};

pub use config::RelayConfig;
pub use date::parse_message_date;
pub use processor::{prepare, MessageProcessor, Outcome};

/// Counts for one or more cycles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub received: usize,
    pub stored: usize,
    pub skipped: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Stored(_) => self.stored += 1,
            Outcome::Skipped(_) => self.skipped += 1,
        }
    }

    pub fn merge(&mut self, other: BatchReport) {
        self.received += other.received;
        self.stored += other.stored;
        self.skipped += other.skipped;
    }
}

pub struct Relay<Q: ?Sized, S: ?Sized> {
    queue: Arc<Q>,
    processor: MessageProcessor<Q, S>,
    max_messages: i32,
    wait_time: Duration,
}

impl<Q, S> Relay<Q, S>
where
    Q: MessageQueue + ?Sized,
    S: ObjectStore + ?Sized,
{
    pub fn new(config: &RelayConfig, queue: Arc<Q>, store: Arc<S>) -> Self {
        Self {
            processor: MessageProcessor::new(Arc::clone(&queue), store),
            queue,
            max_messages: config.max_messages,
            wait_time: config.wait_time,
        }
    }

    pub fn processor(&self) -> &MessageProcessor<Q, S> {
        &self.processor
    }

    /// Pulls one batch, long-polling up to the configured wait time.
    pub async fn receive(&self) -> Result<Vec<QueueMessage>, RelayError> {
        Ok(self.queue.receive(self.max_messages, self.wait_time).await?)
    }

    /// Processes a received batch in delivery order.
    ///
    /// Stops at the first fatal error; messages after it stay on the queue.
    pub async fn process_batch(
        &self,
        messages: &[QueueMessage],
    ) -> Result<BatchReport, RelayError> {
        let mut report = BatchReport {
            received: messages.len(),
            ..BatchReport::default()
        };

        for message in messages {
            let outcome = self.processor.process(message).await?;
            report.record(&outcome);
        }

        Ok(report)
    }

    /// Runs one receive-process cycle.
    ///
    /// An empty batch is a successful cycle. Any error is logged here and
    /// returned unchanged.
    #[instrument(skip_all)]
    pub async fn run_cycle(&self) -> Result<BatchReport, RelayError> {
        let result = async {
            let messages = self.receive().await?;
            self.process_batch(&messages).await
        }
        .await;

        match &result {
            Ok(report) => info!(
                received = report.received,
                stored = report.stored,
                skipped = report.skipped,
                "relay cycle completed"
            ),
            Err(e) => error!(error=%e, "relay cycle failed"),
        }
        result
    }

    /// Keeps running cycles until `shutdown` resolves or a cycle fails.
    ///
    /// Shutdown is only observed while waiting on the queue. A batch that was
    /// received is always processed to the end.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<BatchReport, RelayError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut total = BatchReport::default();

        loop {
            let received = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested, stopping relay");
                    return Ok(total);
                }
                received = self.receive() => received,
            };

            let report = match received {
                Ok(messages) => self.process_batch(&messages).await,
                Err(e) => Err(e),
            }
            .map_err(|e| {
                error!(error=%e, "relay cycle failed");
                e
            })?;

            if report.received > 0 {
                info!(
                    received = report.received,
                    stored = report.stored,
                    skipped = report.skipped,
                    "relay cycle completed"
                );
            }
            total.merge(report);
        }
    }
}
