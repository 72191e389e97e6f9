//! HTTP rate provider for REST APIs shaped like `GET {base}/rates/{FROM}/{TO}`.

use async_trait::async_trait;
use converter_types::{CurrencyCode, ProviderError, RateProvider};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://swop.cx/rest";
pub const DEFAULT_RATE_FIELD: &str = "quote";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Longest upstream error body kept in a `ProviderError`.
const MAX_ERROR_BODY: usize = 512;

/// Configuration of an HTTP rate provider.
#[derive(Debug, Clone)]
pub struct HttpRateProviderConfig {
    pub base_url: String,
    /// Sent as `Authorization: ApiKey {key}` when present.
    pub api_key: Option<String>,
    /// JSON field holding the rate (`quote` or `rate`, fixed per provider).
    pub rate_field: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Total attempts, first one included.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl Default for HttpRateProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            rate_field: DEFAULT_RATE_FIELD.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Rate provider backed by a remote REST API.
pub struct HttpRateProvider {
    config: HttpRateProviderConfig,
    client: reqwest::Client,
}

impl HttpRateProvider {
    pub fn new(config: HttpRateProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpRateProviderConfig {
        &self.config
    }

    pub fn rate_url(&self, from: CurrencyCode, to: CurrencyCode) -> String {
        format!(
            "{}/rates/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            from,
            to
        )
    }

    /// One GET. Returns the body of a 2xx response.
    async fn attempt(&self, url: &str) -> Result<String, ProviderError> {
        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(key) = &self.config.api_key {
            request = request.header(AUTHORIZATION, format!("ApiKey {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip_all, fields(from = %from, to = %to))]
    async fn fetch(&self, from: CurrencyCode, to: CurrencyCode) -> Result<f64, ProviderError> {
        let url = self.rate_url(from, to);
        let max_attempts = self.config.max_attempts.max(1);
        let started = Instant::now();

        let mut attempt = 0;
        let body = loop {
            attempt += 1;
            match self.attempt(&url).await {
                Ok(body) => break body,
                Err(e) if attempt < max_attempts => {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "Rate fetch attempt failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => {
                    error!(attempts = attempt, error = %e, "Rate fetch failed");
                    return Err(e);
                }
            }
        };

        let rate = extract_rate(&body, &self.config.rate_field).inspect_err(|e| {
            error!(error = %e, "Rate provider response rejected");
        })?;

        debug!(
            rate,
            attempts = attempt,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetched exchange rate"
        );
        Ok(rate)
    }
}

/// Reads the rate from a provider JSON body.
///
/// A missing field is `RateNotFound`; anything that is present but not a
/// finite positive number is `Malformed`.
pub fn extract_rate(body: &str, field: &str) -> Result<f64, ProviderError> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("invalid JSON: {}", e)))?;

    let value = json.get(field).ok_or(ProviderError::RateNotFound)?;
    if value.is_null() {
        return Err(ProviderError::RateNotFound);
    }

    let rate = value
        .as_f64()
        .ok_or_else(|| ProviderError::Malformed(format!("`{}` is not a number", field)))?;

    if !rate.is_finite() || rate <= 0.0 {
        return Err(ProviderError::Malformed(format!(
            "`{}` must be a positive number, got {}",
            field, rate
        )));
    }

    Ok(rate)
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}
