// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin the probe paths are resolved against.
    pub base_url: Url,
    pub timeout_secs: u64,
    pub output: OutputFormat,
    pub metrics: MetricsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            timeout_secs: 10,
            output: OutputFormat::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.to_string()));
        }
        self.metrics.validate()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.is_empty() || !self.path.starts_with('/') {
            return Err(ConfigError::InvalidMetricsPath(self.path.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("base_url {0} cannot be used as a base for relative paths")]
    InvalidBaseUrl(String),

    #[error("metrics path {0:?} must start with '/'")]
    InvalidMetricsPath(String),
}
