// src/health/checker.rs
use super::target::ProbeTarget;
use crate::config::Config;
use crate::status::ServiceStatus;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::debug;
use url::Url;

/// Issues a single reachability request for a target.
///
/// `Ok` means the service answered (whatever the status code); `Err` means
/// the request could not complete at all.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: ProbeTarget) -> Result<ProbeResponse, ProbeError>;
}

#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub target: ProbeTarget,
    pub status_code: u16,
    pub response_time_ms: u64,
}

impl ProbeResponse {
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus::from_http_status(self.status_code)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid probe url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
}

/// `reqwest`-backed prober resolving target paths against a base url.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(ProbeError::Client)?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ProbeError> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    /// Paths are absolute, so any path on the base url is replaced.
    pub fn url_for(&self, target: ProbeTarget) -> Result<Url, ProbeError> {
        Ok(self.base_url.join(target.path())?)
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: ProbeTarget) -> Result<ProbeResponse, ProbeError> {
        let url = self.url_for(target)?;
        let start = Instant::now();

        let result = timeout(self.timeout, self.client.get(url.as_str()).send()).await;
        let response_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(response)) => {
                let status_code = response.status().as_u16();
                debug!(%target, %url, status_code, response_time_ms, "probe answered");
                Ok(ProbeResponse {
                    target,
                    status_code,
                    response_time_ms,
                })
            }
            Ok(Err(source)) => Err(ProbeError::Transport {
                url: url.to_string(),
                source,
            }),
            Err(_) => Err(ProbeError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }),
        }
    }
}
