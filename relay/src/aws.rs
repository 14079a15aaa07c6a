use std::sync::Arc;

use aws_config::{BehaviorVersion, SdkConfig};
use queues::SqsQueue;
use storage::S3Store;
use tracing::info;

use crate::{Relay, RelayConfig};

pub type AwsRelay = Relay<SqsQueue, S3Store>;

/// Loads credentials and region from the default AWS provider chain.
pub async fn load_sdk_config(endpoint_url: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(endpoint_url) = endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    loader.load().await
}

/// Builds a relay wired to SQS and S3.
pub async fn connect(config: &RelayConfig) -> AwsRelay {
    let sdk_config = load_sdk_config(config.endpoint_url.as_deref()).await;

    let sqs_client = aws_sdk_sqs::Client::new(&sdk_config);
    // custom endpoints (LocalStack, MinIO) generally do not serve virtual-hosted buckets
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.endpoint_url.is_some())
        .build();
    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    info!(
        queue_url=%config.queue_url,
        bucket=%config.bucket,
        endpoint_url=?config.endpoint_url,
        "relay connected"
    );

    Relay::new(
        config,
        Arc::new(SqsQueue::new(sqs_client, config.queue_url.clone())),
        Arc::new(S3Store::new(s3_client, config.bucket.clone())),
    )
}
