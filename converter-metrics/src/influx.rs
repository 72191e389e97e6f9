//! InfluxDB v2 emitter.

use crate::line_protocol;
use converter_types::{MeasurementRecord, MetricsEmitter};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const DEFAULT_URL: &str = "http://influxdb:8086";
pub const DEFAULT_BUCKET: &str = "currency_converter";
pub const DEFAULT_ORG: &str = "currency-converter";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Metrics emitter is disabled")]
    Disabled,

    #[error("Metrics request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Metrics collector returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Connection settings for the collector.
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub url: String,
    /// Emission is disabled when this is missing or empty.
    pub token: Option<String>,
    pub bucket: String,
    pub org: String,
    pub timeout: Duration,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            token: None,
            bucket: DEFAULT_BUCKET.to_string(),
            org: DEFAULT_ORG.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

struct Inner {
    config: InfluxConfig,
    client: reqwest::Client,
    /// Fixed at construction.
    token: Option<String>,
}

/// Best-effort emitter writing line protocol to InfluxDB.
///
/// Cheap to clone; clones share one HTTP client.
#[derive(Clone)]
pub struct InfluxEmitter {
    inner: Arc<Inner>,
}

#[derive(Deserialize)]
struct HealthBody {
    status: String,
}

impl InfluxEmitter {
    pub fn new(config: InfluxConfig) -> Self {
        let token = config.token.clone().filter(|t| !t.trim().is_empty());
        if token.is_none() {
            warn!("INFLUXDB_TOKEN not set, metrics emission is disabled");
        } else {
            info!(
                url = %config.url,
                bucket = %config.bucket,
                org = %config.org,
                "Metrics emitter enabled"
            );
        }

        // Falls back to a default client; the timeout only matters when enabled.
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to build metrics HTTP client, using defaults");
                reqwest::Client::new()
            });

        Self {
            inner: Arc::new(Inner {
                config,
                client,
                token,
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.token.is_some()
    }

    pub fn config(&self) -> &InfluxConfig {
        &self.inner.config
    }

    fn base_url(&self) -> &str {
        self.inner.config.url.trim_end_matches('/')
    }

    /// Writes one record and waits for the collector's answer.
    pub async fn write(&self, record: &MeasurementRecord) -> Result<(), MetricsError> {
        let token = self.inner.token.as_deref().ok_or(MetricsError::Disabled)?;
        self.write_line(token, line_protocol::encode(record)).await
    }

    async fn write_line(&self, token: &str, line: String) -> Result<(), MetricsError> {
        let config = &self.inner.config;
        let url = format!("{}/api/v2/write", self.base_url());

        let response = self
            .inner
            .client
            .post(url)
            .query(&[
                ("bucket", config.bucket.as_str()),
                ("org", config.org.as_str()),
                ("precision", "ns"),
            ])
            .header(AUTHORIZATION, format!("Token {}", token))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(line)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetricsError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Checks `GET {url}/health`. Healthy means 2xx with `"status": "pass"`.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.base_url());
        let response = match self.inner.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Metrics health check failed");
                return false;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "Metrics collector unhealthy");
            return false;
        }

        match response.json::<HealthBody>().await {
            Ok(body) => body.status == "pass",
            Err(e) => {
                warn!(error = %e, "Unreadable metrics health response");
                false
            }
        }
    }
}

impl MetricsEmitter for InfluxEmitter {
    fn emit(&self, record: MeasurementRecord) {
        let Some(token) = self.inner.token.clone() else {
            return;
        };

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(measurement = record.name(), "No async runtime, metric dropped");
                return;
            }
        };

        // Encode now so the timestamp reflects the event, not the write.
        let line = line_protocol::encode(&record);
        let emitter = self.clone();
        handle.spawn(async move {
            match emitter.write_line(&token, line.clone()).await {
                Ok(()) => debug!(measurement = record.name(), "Metric written"),
                Err(e) => error!(error = %e, line = %line, "Failed to write metric"),
            }
        });
    }
}
