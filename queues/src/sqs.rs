use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::Message;
use internals::{QueueError, QueueMessage};
use tracing::{error, info, instrument, warn};

use crate::{check_batch_size, MessageQueue, MAX_WAIT_TIME};

/// [`MessageQueue`] backed by an Amazon SQS queue.
///
/// Redelivery of skipped messages relies on the visibility timeout configured
/// on the queue itself.
#[derive(Clone, Debug)]
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsQueue {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

/// Converts an SDK message into a delivery the relay can acknowledge.
pub fn into_queue_message(message: Message) -> Result<QueueMessage, QueueError> {
    let message_id = message
        .message_id
        .ok_or_else(|| QueueError::InvalidMessage("missing message id".to_string()))?;
    let receipt_handle = message.receipt_handle.ok_or_else(|| {
        QueueError::InvalidMessage(format!("message '{}' has no receipt handle", message_id))
    })?;

    Ok(QueueMessage {
        message_id,
        receipt_handle,
        // an absent body is skipped later as malformed
        body: message.body.unwrap_or_default(),
    })
}

#[async_trait]
impl MessageQueue for SqsQueue {
    #[instrument(skip_all, fields(queue_url=%self.queue_url, max_messages=%max_messages))]
    async fn receive(
        &self,
        max_messages: i32,
        wait: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        check_batch_size(max_messages)?;
        let wait_seconds = wait.min(MAX_WAIT_TIME).as_secs() as i32;

        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_seconds)
            .send()
            .await
            .map_err(|e| {
                let reason = DisplayErrorContext(&e).to_string();
                error!(error=%reason, "receive_message failed");
                QueueError::Receive(reason)
            })?;

        let messages: Vec<QueueMessage> = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|message| match into_queue_message(message) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!(error=%e, "dropping undeliverable message from batch");
                    None
                }
            })
            .collect();

        info!(count = messages.len(), "batch received");
        Ok(messages)
    }

    #[instrument(skip_all, fields(queue_url=%self.queue_url))]
    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| {
                let reason = DisplayErrorContext(&e).to_string();
                error!(error=%reason, "delete_message failed");
                QueueError::Delete(reason)
            })?;
        Ok(())
    }
}
