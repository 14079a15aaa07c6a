//! Object store side of the relay: put-by-key with overwrite on conflict.

pub mod memory;
pub mod s3;

use async_trait::async_trait;
use internals::{StorageKey, StoreError};

pub use memory::InMemoryStore;
pub use s3::S3Store;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `body` under `key`, replacing whatever was there.
    async fn put(&self, key: &StorageKey, body: Vec<u8>) -> Result<(), StoreError>;
}
