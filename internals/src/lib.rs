use std::fmt;

use chrono::{DateTime, Datelike, Utc};

mod errors;

pub use errors::{ConfigError, QueueError, RelayError, SkipReason, StoreError};

/// A single delivery handed out by a queue.
///
/// The same `message_id` may show up more than once (at-least-once delivery),
/// each time with a different `receipt_handle`.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct QueueMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
}

impl QueueMessage {
    pub fn new(
        message_id: impl Into<String>,
        receipt_handle: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            receipt_handle: receipt_handle.into(),
            body: body.into(),
        }
    }
}

/// Object store path of a relayed message: `YYYY/MM/DD/<message_id>.json`.
///
/// Derived only from the message date and id, so a redelivered message lands
/// on the same key and overwrites the previous copy.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn derive(date: &DateTime<Utc>, message_id: &str) -> Self {
        StorageKey(format!(
            "{:04}/{:02}/{:02}/{}.json",
            date.year(),
            date.month(),
            date.day(),
            message_id
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
