use thiserror::Error;

/// Why a message was left on the queue without being stored.
///
/// These are recoverable: the message is neither written nor deleted, and the
/// queue hands it out again once its visibility timeout expires.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Body is not valid JSON
    #[error("Malformed message body: {0}")]
    MalformedBody(String),

    /// Body is valid JSON but not an object, so it cannot carry a `date` field
    #[error("Message body is not a JSON object")]
    NotAnObject,

    /// `date` is absent, null or an empty string
    #[error("Message does not contain a 'date' field")]
    MissingDate,

    /// `date` is present but holds something other than a string
    #[error("Message 'date' field is not a string")]
    DateNotAString,

    /// `date` could not be parsed as an ISO-8601 timestamp
    #[error("Malformed date '{value}': {reason}")]
    MalformedDate { value: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Failed to receive messages: {0}")]
    Receive(String),

    #[error("Failed to delete message: {0}")]
    Delete(String),

    /// Delivery is missing a field needed to process or acknowledge it
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Failed to put object '{key}': {reason}")]
    Put { key: String, reason: String },
}

/// Errors that abort a whole relay cycle.
///
/// Nothing here is handled per message; the caller is expected to retry the
/// entire cycle, which is safe because storage keys are deterministic and
/// deletes only follow confirmed writes.
#[derive(Error, Debug, Clone)]
pub enum RelayError {
    #[error("Queue error: {0}")]
    Receive(#[from] QueueError),

    #[error("Failed to store message '{message_id}': {source}")]
    Store {
        message_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to acknowledge message '{message_id}': {source}")]
    Delete {
        message_id: String,
        #[source]
        source: QueueError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}
