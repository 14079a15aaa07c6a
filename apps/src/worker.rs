//! Relay worker CLI
//!
//! Runs a single relay cycle by default, which suits an external scheduler
//! (cron, ECS scheduled task). With `--continuous` it keeps polling until
//! Ctrl-C or the first fatal error.

use std::time::Duration;

use clap::Parser;
use relay::config::{BUCKET_ENV, ENDPOINT_URL_ENV, QUEUE_URL_ENV};
use relay::RelayConfig;
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// URL of the queue to drain
    #[arg(long, env = QUEUE_URL_ENV)]
    queue_url: String,

    /// Bucket receiving the relayed messages
    #[arg(long, env = BUCKET_ENV)]
    bucket: String,

    /// Custom AWS endpoint, e.g. http://localhost:4566
    #[arg(long, env = ENDPOINT_URL_ENV)]
    endpoint_url: Option<String>,

    #[arg(long, default_value_t = 10)]
    max_messages: i32,

    #[arg(long, default_value_t = 20)]
    wait_seconds: u64,

    /// Keep polling instead of exiting after one cycle
    #[arg(long)]
    continuous: bool,
}

impl Args {
    fn into_config(self) -> RelayConfig {
        let config = RelayConfig::new(self.queue_url, self.bucket)
            .with_max_messages(self.max_messages)
            .with_wait_time(Duration::from_secs(self.wait_seconds));

        match self.endpoint_url {
            Some(endpoint_url) => config.with_endpoint_url(endpoint_url),
            None => config,
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error=%e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    utils::init_tracing();

    let args = Args::parse();
    let continuous = args.continuous;
    let config = args.into_config();
    config.validate()?;

    let relay = relay::aws::connect(&config).await;

    let report = if continuous {
        info!("relay worker polling until shutdown");
        relay.run_until(shutdown_signal()).await?
    } else {
        relay.run_cycle().await?
    };

    info!(
        received = report.received,
        stored = report.stored,
        skipped = report.skipped,
        "relay worker finished"
    );
    Ok(())
}
