//! HTTP client for the daily market summary files.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use engine_core::{canonical_date, TransportError};
use telemetry::metrics;
use tracing::{debug, info};

use crate::config::SourceConfig;

/// Raw bytes of one day's file as delivered by the source.
#[derive(Debug, Clone)]
pub struct FetchedPayload {
    pub bytes: Bytes,
    /// Where the bytes came from (the request URL for HTTP sources).
    pub label: String,
}

/// A source of daily market summary files.
///
/// Implemented by [`HttpSource`] in production and by in-memory mocks in tests.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Retrieves the raw file for `date`.
    async fn fetch(&self, date: NaiveDate) -> Result<FetchedPayload, TransportError>;
}

/// Source backed by one HTTP GET per date.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    config: SourceConfig,
}

impl HttpSource {
    /// Creates a new HTTP source with a fixed request timeout.
    pub fn new(config: SourceConfig) -> Result<Self, reqwest::Error> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        if let Some(ref agent) = config.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        let client = builder.build()?;

        info!(
            url_template = %config.url_template,
            timeout_secs = config.timeout_secs,
            "Created market source client"
        );

        Ok(Self { client, config })
    }

    /// Builds and validates the download URL for `date`.
    pub fn url_for(&self, date: NaiveDate) -> Result<url::Url, TransportError> {
        let raw = self.config.url_for(&canonical_date(date));
        url::Url::parse(&raw).map_err(|e| TransportError::InvalidUrl {
            url: raw,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl MarketSource for HttpSource {
    async fn fetch(&self, date: NaiveDate) -> Result<FetchedPayload, TransportError> {
        let url = self.url_for(date)?;
        let label = url.to_string();
        let start = Instant::now();

        info!(url = %label, "Downloading");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: label.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: label,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| TransportError::Body {
            url: label.clone(),
            message: e.to_string(),
        })?;

        let elapsed = start.elapsed();
        metrics().fetch_latency_ms.observe(elapsed.as_millis() as u64);

        debug!(
            url = %label,
            bytes = bytes.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Download complete"
        );

        Ok(FetchedPayload { bytes, label })
    }
}
