use std::sync::Once;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

static TEST_TRACING: Once = Once::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global compact log subscriber. `RUST_LOG` overrides the
/// default `info` level.
///
/// # Examples
///
/// ```
/// utils::init_tracing();
/// tracing::info!("relay starting");
/// ```
pub fn init_tracing() {
    // a subscriber installed earlier (tests, embedding) wins
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter())
        .try_init();
}

/// Subscriber for Lambda, where CloudWatch already stamps every line.
pub fn init_lambda_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .without_time()
        .try_init();
}

/// Routes logs through the test harness capture, once per test binary.
pub fn init_test_tracing() {
    TEST_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .compact()
            .with_env_filter(env_filter())
            .with_test_writer()
            .try_init();
    });
}
