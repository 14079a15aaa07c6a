use async_trait::async_trait;
use dashmap::DashMap;
use internals::{StorageKey, StoreError};
use tracing::debug;

use crate::ObjectStore;

#[derive(Default)]
pub struct InMemoryStore {
    objects: DashMap<String, Vec<u8>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.get(key).map(|object| object.value().clone())
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.iter().map(|o| o.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn put(&self, key: &StorageKey, body: Vec<u8>) -> Result<(), StoreError> {
        debug!(key=%key, bytes = body.len(), "storing object");
        self.objects.insert(key.to_string(), body);
        Ok(())
    }
}
