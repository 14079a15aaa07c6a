use dashmap::DashMap;
use tokio::time::{Duration, Instant};
use tracing::{debug, info};

pub type ReceiptHandle = String;

/// Message sitting in the ready buffer, waiting to be received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingMessage {
    pub message_id: String,
    pub body: String,
    pub receive_count: u32,
}

/// A received but not yet deleted delivery.
pub struct InFlightRecord {
    message: PendingMessage,
    timestamp: Instant,
    duration: Duration,
}

#[derive(Debug, Eq, PartialEq)]
pub enum AckStatus {
    DeadlineExceeded,
    ReceiptNotFound,
}

impl InFlightRecord {
    pub fn new(message: PendingMessage, timestamp: Instant, duration: Duration) -> Self {
        InFlightRecord {
            message,
            timestamp,
            duration,
        }
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        self.get_deadline() <= Instant::now()
    }

    pub fn get_message(&self) -> &PendingMessage {
        &self.message
    }

    pub fn into_message(self) -> PendingMessage {
        self.message
    }

    pub fn get_deadline(&self) -> Instant {
        self.timestamp + self.duration
    }
}

/// Deliveries currently hidden from receivers, keyed by receipt handle.
#[derive(Default)]
pub struct InFlight {
    records: DashMap<ReceiptHandle, InFlightRecord>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hides `message` for `visibility` and returns the receipt handle for
    /// this particular delivery.
    pub fn add_record(&self, message: PendingMessage, visibility: Duration) -> ReceiptHandle {
        let receipt_handle = uuid::Uuid::new_v4().to_string();
        debug!(message_id=%message.message_id, receipt_handle=%receipt_handle, "tracking delivery");
        self.records.insert(
            receipt_handle.clone(),
            InFlightRecord::new(message, Instant::now(), visibility),
        );
        receipt_handle
    }

    pub fn apply_ack(&self, receipt_handle: &str) -> Result<(), AckStatus> {
        let record = self
            .records
            .remove(receipt_handle)
            .map(|(_, record)| record)
            .ok_or(AckStatus::ReceiptNotFound)?;

        if record.is_deadline_exceeded() {
            // it is about to be redelivered under another receipt handle
            info!(message_id=%record.get_message().message_id, "deadline exceeded");
            self.records.insert(receipt_handle.to_string(), record);
            return Err(AckStatus::DeadlineExceeded);
        }

        debug!(message_id=%record.get_message().message_id, "delivery acked");
        Ok(())
    }

    /// Drops every record whose visibility deadline passed and hands the
    /// messages back for redelivery.
    pub fn take_expired(&self) -> Vec<PendingMessage> {
        let expired: Vec<ReceiptHandle> = self
            .records
            .iter()
            .filter(|entry| entry.value().is_deadline_exceeded())
            .map(|entry| entry.key().clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|receipt| self.records.remove(&receipt))
            .map(|(_, record)| record.into_message())
            .collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.records
            .iter()
            .map(|entry| entry.value().get_deadline())
            .min()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
