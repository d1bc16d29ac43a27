//! HTTP reachability probe.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time;
use url::Url;

use crate::probe::{ProbeError, ProbeOutcome, ReachabilityProbe};

/// Issues `GET {origin}{health_path}` and resolves on any response.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(origin: &Url, health_path: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .user_agent("connectivity-monitor-probe")
            .build()
            .map_err(|e| ProbeError::Transport(e.to_string()))?;

        Self::with_client(client, origin, health_path, timeout)
    }

    /// Use a preconfigured client (proxy, TLS, pooling settings).
    pub fn with_client(client: Client, origin: &Url, health_path: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let url = origin.join(health_path)?;
        Ok(Self { client, url, timeout })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ReachabilityProbe for HttpProbe {
    async fn probe(&self) -> Result<ProbeOutcome, ProbeError> {
        let request = self.client.get(self.url.clone()).send();

        match time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if !status.is_success() {
                    tracing::debug!(url = %self.url, status = %status, "Probe answered with non-success status");
                }
                Ok(ProbeOutcome { status: status.as_u16() })
            }
            Ok(Err(e)) => Err(ProbeError::Transport(e.to_string())),
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }
}
