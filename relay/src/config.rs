use std::time::Duration;

use internals::ConfigError;
use queues::{MAX_BATCH_SIZE, MAX_WAIT_TIME};

pub const QUEUE_URL_ENV: &str = "SQS_QUEUE_URL";
pub const BUCKET_ENV: &str = "S3_BUCKET_NAME";
pub const ENDPOINT_URL_ENV: &str = "AWS_ENDPOINT_URL";

/// Configuration for a relay cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub queue_url: String,
    pub bucket: String,
    pub max_messages: i32,
    pub wait_time: Duration,
    /// Overrides the AWS endpoint for both services, e.g. for LocalStack
    pub endpoint_url: Option<String>,
}

impl RelayConfig {
    pub fn new(queue_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            queue_url: queue_url.into(),
            bucket: bucket.into(),
            max_messages: MAX_BATCH_SIZE,
            wait_time: MAX_WAIT_TIME,
            endpoint_url: None,
        }
    }

    /// Reads `SQS_QUEUE_URL`, `S3_BUCKET_NAME` and optionally `AWS_ENDPOINT_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let config = Self::new(required(QUEUE_URL_ENV)?, required(BUCKET_ENV)?);
        let config = match lookup(ENDPOINT_URL_ENV).filter(|value| !value.trim().is_empty()) {
            Some(endpoint_url) => config.with_endpoint_url(endpoint_url),
            None => config,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_max_messages(mut self, max_messages: i32) -> Self {
        self.max_messages = max_messages;
        self
    }

    pub fn with_wait_time(mut self, wait_time: Duration) -> Self {
        self.wait_time = wait_time;
        self
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_url.trim().is_empty() {
            return Err(ConfigError::Missing(QUEUE_URL_ENV));
        }
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::Missing(BUCKET_ENV));
        }
        if !(1..=MAX_BATCH_SIZE).contains(&self.max_messages) {
            return Err(ConfigError::Invalid {
                field: "max_messages",
                reason: format!("must be between 1 and {}", MAX_BATCH_SIZE),
            });
        }
        if self.wait_time > MAX_WAIT_TIME {
            return Err(ConfigError::Invalid {
                field: "wait_time",
                reason: format!("must not exceed {} seconds", MAX_WAIT_TIME.as_secs()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_match_long_poll_limits() {
        let config = RelayConfig::new("https://queue", "bucket");
        assert_eq!(config.max_messages, 10);
        assert_eq!(config.wait_time, Duration::from_secs(20));
        assert!(config.endpoint_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_reads_required_settings() {
        let config = RelayConfig::from_lookup(lookup(&[
            (QUEUE_URL_ENV, "https://sqs.eu-west-1.amazonaws.com/123/events"),
            (BUCKET_ENV, "event-archive"),
        ]))
        .unwrap();

        assert_eq!(
            config.queue_url,
            "https://sqs.eu-west-1.amazonaws.com/123/events"
        );
        assert_eq!(config.bucket, "event-archive");
        assert!(config.endpoint_url.is_none());
    }

    #[test]
    fn test_from_lookup_reads_endpoint_override() {
        let config = RelayConfig::from_lookup(lookup(&[
            (QUEUE_URL_ENV, "http://localhost:4566/000000000000/events"),
            (BUCKET_ENV, "event-archive"),
            (ENDPOINT_URL_ENV, "http://localhost:4566"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:4566"));
    }

    #[test]
    fn test_missing_settings_are_fatal() {
        assert_eq!(
            RelayConfig::from_lookup(lookup(&[(BUCKET_ENV, "b")])).unwrap_err(),
            ConfigError::Missing(QUEUE_URL_ENV)
        );
        assert_eq!(
            RelayConfig::from_lookup(lookup(&[(QUEUE_URL_ENV, "q")])).unwrap_err(),
            ConfigError::Missing(BUCKET_ENV)
        );
        assert_eq!(
            RelayConfig::from_lookup(lookup(&[(QUEUE_URL_ENV, "q"), (BUCKET_ENV, "  ")]))
                .unwrap_err(),
            ConfigError::Missing(BUCKET_ENV)
        );
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let config = RelayConfig::new("q", "b").with_max_messages(11);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "max_messages",
                ..
            })
        ));

        let config = RelayConfig::new("q", "b").with_wait_time(Duration::from_secs(21));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "wait_time",
                ..
            })
        ));

        let config = RelayConfig::new("q", "b")
            .with_max_messages(1)
            .with_wait_time(Duration::ZERO);
        assert!(config.validate().is_ok());
    }
}
