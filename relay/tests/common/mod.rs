#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use internals::{QueueError, QueueMessage, StorageKey, StoreError};
use queues::MessageQueue;
use storage::{InMemoryStore, ObjectStore};

/// Side effects in the order they happened, shared by queue and store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Receive,
    Put(String),
    Delete(String),
}

pub type Journal = Arc<Mutex<Vec<Event>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(journal: &Journal) -> Vec<Event> {
    journal.lock().unwrap().clone()
}

pub fn message(id: &str, body: &str) -> QueueMessage {
    QueueMessage::new(id, format!("rh-{}", id), body)
}

/// Hands out prepared batches, one per receive.
pub struct ScriptedQueue {
    journal: Journal,
    batches: Mutex<VecDeque<Result<Vec<QueueMessage>, QueueError>>>,
    failing_receipts: HashSet<String>,
}

impl ScriptedQueue {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: Arc::clone(journal),
            batches: Mutex::new(VecDeque::new()),
            failing_receipts: HashSet::new(),
        }
    }

    pub fn with_batch(self, batch: Vec<QueueMessage>) -> Self {
        self.batches.lock().unwrap().push_back(Ok(batch));
        self
    }

    pub fn with_receive_error(self, error: QueueError) -> Self {
        self.batches.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn failing_delete(mut self, receipt_handle: &str) -> Self {
        self.failing_receipts.insert(receipt_handle.to_string());
        self
    }
}

#[async_trait]
impl MessageQueue for ScriptedQueue {
    async fn receive(
        &self,
        max_messages: i32,
        wait: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        assert!((1..=10).contains(&max_messages));
        self.journal.lock().unwrap().push(Event::Receive);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                // nothing scripted: behave like a long poll that times out
                tokio::time::sleep(wait).await;
                Ok(Vec::new())
            }
        }
    }

    async fn delete(&self, receipt_handle: &str) -> Result<(), QueueError> {
        if self.failing_receipts.contains(receipt_handle) {
            return Err(QueueError::Delete("access denied".to_string()));
        }
        self.journal
            .lock()
            .unwrap()
            .push(Event::Delete(receipt_handle.to_string()));
        Ok(())
    }
}

/// In-memory store that journals writes and can refuse chosen keys.
pub struct RecordingStore {
    journal: Journal,
    inner: InMemoryStore,
    failing_keys: HashSet<String>,
}

impl RecordingStore {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: Arc::clone(journal),
            inner: InMemoryStore::new(),
            failing_keys: HashSet::new(),
        }
    }

    pub fn failing_put(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner
            .get(key)
            .map(|body| String::from_utf8(body).unwrap())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put(&self, key: &StorageKey, body: Vec<u8>) -> Result<(), StoreError> {
        if self.failing_keys.contains(key.as_str()) {
            return Err(StoreError::Put {
                key: key.to_string(),
                reason: "service unavailable".to_string(),
            });
        }
        self.journal
            .lock()
            .unwrap()
            .push(Event::Put(key.to_string()));
        self.inner.put(key, body).await
    }
}
