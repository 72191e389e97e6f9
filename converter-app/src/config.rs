//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use anyhow::Context;
use converter_metrics::InfluxConfig;
use exchange_rates::HttpRateProviderConfig;

/// Which rate provider backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Http,
    /// Fixed development table, no network access.
    Static,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub provider: ProviderKind,
    pub rates: HttpRateProviderConfig,
    pub cache_ttl: Duration,
    pub influx: InfluxConfig,
    /// OTLP collector for traces and metrics; exporting is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid port number")?;

        let provider = match var("RATE_PROVIDER").as_deref() {
            None | Some("http") => ProviderKind::Http,
            Some("static") => ProviderKind::Static,
            Some(other) => anyhow::bail!(
                "RATE_PROVIDER must be `http` or `static`, got `{}`",
                other
            ),
        };

        let mut rates = HttpRateProviderConfig::default();
        if let Some(url) = var("RATE_PROVIDER_BASE_URL") {
            rates.base_url = url;
        }
        rates.api_key = var("RATE_PROVIDER_API_KEY");
        if let Some(field) = var("RATE_PROVIDER_RATE_FIELD") {
            rates.rate_field = field;
        }

        let cache_ttl = match var("RATE_CACHE_TTL_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse()
                    .context("RATE_CACHE_TTL_SECS must be a whole number of seconds")?,
            ),
            None => exchange_rates::cache::DEFAULT_TTL,
        };

        let mut influx = InfluxConfig::default();
        if let Some(url) = var("INFLUXDB_URL") {
            influx.url = url;
        }
        influx.token = var("INFLUXDB_TOKEN");
        if let Some(bucket) = var("INFLUXDB_BUCKET") {
            influx.bucket = bucket;
        }
        if let Some(org) = var("INFLUXDB_ORG") {
            influx.org = org;
        }

        Ok(Self {
            port,
            provider,
            rates,
            cache_ttl,
            influx,
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.provider, ProviderKind::Http);
        assert_eq!(config.rates.base_url, "https://swop.cx/rest");
        assert_eq!(config.rates.rate_field, "quote");
        assert_eq!(config.rates.api_key, None);
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.influx.url, "http://influxdb:8086");
        assert_eq!(config.influx.token, None);
        assert_eq!(config.influx.bucket, "currency_converter");
        assert_eq!(config.influx.org, "currency-converter");
        assert_eq!(config.otlp_endpoint, None);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("RATE_PROVIDER", "static"),
            ("RATE_PROVIDER_BASE_URL", "http://rates.local"),
            ("RATE_PROVIDER_API_KEY", "key"),
            ("RATE_PROVIDER_RATE_FIELD", "rate"),
            ("RATE_CACHE_TTL_SECS", "60"),
            ("INFLUXDB_URL", "http://localhost:8086"),
            ("INFLUXDB_TOKEN", "tok"),
            ("INFLUXDB_BUCKET", "b"),
            ("INFLUXDB_ORG", "o"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.provider, ProviderKind::Static);
        assert_eq!(config.rates.base_url, "http://rates.local");
        assert_eq!(config.rates.api_key.as_deref(), Some("key"));
        assert_eq!(config.rates.rate_field, "rate");
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.influx.url, "http://localhost:8086");
        assert_eq!(config.influx.token.as_deref(), Some("tok"));
        assert_eq!(config.influx.bucket, "b");
        assert_eq!(config.influx.org, "o");
    }

    #[test]
    fn test_blank_token_is_unset() {
        let config = load(&[("INFLUXDB_TOKEN", "  ")]).unwrap();
        assert_eq!(config.influx.token, None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(load(&[("PORT", "http")]).is_err());
        assert!(load(&[("RATE_CACHE_TTL_SECS", "-1")]).is_err());
        assert!(load(&[("RATE_PROVIDER", "carrier-pigeon")]).is_err());
    }
}
