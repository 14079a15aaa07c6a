//! AWS Lambda entrypoint, one relay cycle per invocation.
//!
//! The function is meant to be triggered on a schedule. The event payload is
//! ignored. A failed cycle fails the invocation so the trigger's own retry
//! policy runs the whole cycle again.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use relay::aws::AwsRelay;
use relay::{BatchReport, RelayConfig};
use serde_json::Value;

async fn function_handler(
    relay: &AwsRelay,
    _event: LambdaEvent<Value>,
) -> Result<BatchReport, Error> {
    Ok(relay.run_cycle().await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    utils::init_lambda_tracing();

    // missing settings fail the cold start, before any message is received
    let config = RelayConfig::from_env()?;
    let relay = relay::aws::connect(&config).await;
    let relay = &relay;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        function_handler(relay, event).await
    }))
    .await
}
