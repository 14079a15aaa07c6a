use std::sync::Arc;

use internals::{QueueMessage, RelayError, SkipReason, StorageKey};
use queues::MessageQueue;
use serde_json::Value;
use storage::ObjectStore;
use tracing::{debug, info, instrument, warn};

use crate::date::parse_message_date;

const DATE_FIELD: &str = "date";

/// What happened to a single message.
///
/// Fatal failures are not an outcome: they come back as `Err(RelayError)`
/// and end the whole cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Written to the store and deleted from the queue.
    Stored(StorageKey),
    /// Left on the queue untouched, to be redelivered after its visibility timeout.
    Skipped(SkipReason),
}

/// Parses a message body and derives where it goes.
///
/// Returns the storage key together with the body re-serialized as compact
/// JSON. Field order and the exact text of every number are kept.
pub fn prepare(message: &QueueMessage) -> Result<(StorageKey, Vec<u8>), SkipReason> {
    let body: Value = serde_json::from_str(&message.body)
        .map_err(|e| SkipReason::MalformedBody(e.to_string()))?;

    let date = match body.as_object().ok_or(SkipReason::NotAnObject)?.get(DATE_FIELD) {
        None | Some(Value::Null) => return Err(SkipReason::MissingDate),
        Some(Value::String(date)) if date.is_empty() => return Err(SkipReason::MissingDate),
        Some(Value::String(date)) => parse_message_date(date)?,
        Some(_) => return Err(SkipReason::DateNotAString),
    };

    let key = StorageKey::derive(&date, &message.message_id);
    let payload =
        serde_json::to_vec(&body).map_err(|e| SkipReason::MalformedBody(e.to_string()))?;

    Ok((key, payload))
}

/// Moves one message from the queue into the object store.
///
/// The queue and the store are handed in at construction, which is also how
/// tests swap in doubles.
pub struct MessageProcessor<Q: ?Sized, S: ?Sized> {
    queue: Arc<Q>,
    store: Arc<S>,
}

impl<Q, S> MessageProcessor<Q, S>
where
    Q: MessageQueue + ?Sized,
    S: ObjectStore + ?Sized,
{
    pub fn new(queue: Arc<Q>, store: Arc<S>) -> Self {
        Self { queue, store }
    }

    /// Stores the message and, only once the write succeeded, deletes it.
    ///
    /// Unparseable bodies and missing or malformed dates are skipped without
    /// any side effect. A failed write or delete is returned as an error; in
    /// the write case no delete is attempted.
    #[instrument(skip_all, fields(message_id=%message.message_id))]
    pub async fn process(&self, message: &QueueMessage) -> Result<Outcome, RelayError> {
        let (key, payload) = match prepare(message) {
            Ok(prepared) => prepared,
            Err(reason) => {
                // TODO: route repeatedly skipped messages to a dead-letter queue
                warn!(reason=%reason, "skipping message, left for redelivery");
                return Ok(Outcome::Skipped(reason));
            }
        };

        self.store
            .put(&key, payload)
            .await
            .map_err(|source| RelayError::Store {
                message_id: message.message_id.clone(),
                source,
            })?;
        debug!(key=%key, "message stored");

        self.queue
            .delete(&message.receipt_handle)
            .await
            .map_err(|source| RelayError::Delete {
                message_id: message.message_id.clone(),
                source,
            })?;

        info!(key=%key, "message relayed");
        Ok(Outcome::Stored(key))
    }
}
