use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use internals::{StorageKey, StoreError};
use tracing::{error, info, instrument};

use crate::ObjectStore;

const CONTENT_TYPE: &str = "application/json";

/// [`ObjectStore`] writing into a single S3 bucket.
#[derive(Clone, Debug)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[instrument(skip_all, fields(bucket=%self.bucket, key=%key))]
    async fn put(&self, key: &StorageKey, body: Vec<u8>) -> Result<(), StoreError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .content_type(CONTENT_TYPE)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                let reason = DisplayErrorContext(&e).to_string();
                error!(error=%reason, "put_object failed");
                StoreError::Put {
                    key: key.to_string(),
                    reason,
                }
            })?;

        info!(bytes = size, "object stored");
        Ok(())
    }
}
