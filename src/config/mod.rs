use std::time::Duration;

use garde::Validate;
use serde::Deserialize;

use crate::app_state::ServiceSettings;
use crate::services::poller::RetryPolicy;

#[derive(Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind_addr")]
    #[garde(length(min = 1))]
    pub bind_addr: String,

    /// Google Cloud Vision API key
    #[garde(length(min = 1))]
    pub vision_api_key: String,

    /// Cloud Vision REST endpoint
    #[serde(default = "default_vision_endpoint")]
    #[garde(length(min = 1))]
    pub vision_endpoint: String,

    /// Social-graph API base URL (photo upload and delete)
    #[serde(default = "default_graph_base_url")]
    #[garde(length(min = 1))]
    pub graph_base_url: String,

    /// Social-graph access token
    #[garde(length(min = 1))]
    pub graph_access_token: String,

    /// Recognition endpoint polled with `photo_id`
    #[garde(length(min = 1))]
    pub recognition_url: String,

    /// Recognition queries per photo before giving up
    #[serde(default = "default_poll_max_attempts")]
    #[garde(range(min = 1, max = 100))]
    pub poll_max_attempts: u32,

    /// Delay between recognition queries
    #[serde(default)]
    #[garde(skip)]
    pub poll_interval_ms: u64,

    /// Delay between upload and the first recognition query
    #[serde(default = "default_poll_settle_delay_ms")]
    #[garde(skip)]
    pub poll_settle_delay_ms: u64,

    /// Upper bound on one whole recognition request, cleanup excluded
    #[serde(default = "default_recognition_timeout_secs")]
    #[garde(range(min = 1))]
    pub recognition_timeout_secs: u64,

    /// Per-request timeout for outbound provider calls
    #[serde(default = "default_http_timeout_secs")]
    #[garde(range(min = 1))]
    pub http_timeout_secs: u64,

    /// Largest accepted upload or fetched image, in bytes
    #[serde(default = "default_max_upload_bytes")]
    #[garde(range(min = 1024))]
    pub max_upload_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_vision_endpoint() -> String {
    "https://vision.googleapis.com".to_string()
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_poll_max_attempts() -> u32 {
    crate::services::poller::DEFAULT_MAX_ATTEMPTS
}

fn default_poll_settle_delay_ms() -> u64 {
    1000
}

fn default_recognition_timeout_secs() -> u64 {
    60
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.poll_max_attempts,
            inter_attempt_delay: Duration::from_millis(self.poll_interval_ms),
            settle_delay: Duration::from_millis(self.poll_settle_delay_ms),
        }
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            retry: self.retry_policy(),
            recognition_timeout: Duration::from_secs(self.recognition_timeout_secs),
            max_upload_bytes: self.max_upload_bytes,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] garde::Report),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut vars = vec![
            ("VISION_API_KEY", "vision-key"),
            ("GRAPH_ACCESS_TOKEN", "graph-token"),
            ("RECOGNITION_URL", "https://www.example.com/photos/tagging/recognition/"),
        ];
        vars.extend_from_slice(extra);
        vars.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config: AppConfig = envy::from_iter(vars(&[])).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.poll_max_attempts, 10);

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.inter_attempt_delay, Duration::ZERO);
        assert_eq!(policy.settle_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_overrides() {
        let config: AppConfig = envy::from_iter(vars(&[
            ("POLL_MAX_ATTEMPTS", "3"),
            ("POLL_INTERVAL_MS", "250"),
            ("POLL_SETTLE_DELAY_MS", "0"),
        ]))
        .unwrap();
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.inter_attempt_delay, Duration::from_millis(250));
        assert_eq!(policy.settle_delay, Duration::ZERO);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config: AppConfig = envy::from_iter(vars(&[("POLL_MAX_ATTEMPTS", "0")])).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credentials() {
        let result: Result<AppConfig, _> = envy::from_iter(vec![(
            "RECOGNITION_URL".to_string(),
            "https://www.example.com/recognition".to_string(),
        )]);
        assert!(result.is_err());
    }
}
