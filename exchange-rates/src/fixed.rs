//! Fixed-table rate provider for development and testing.
//!
//! Every currency is described by its value in USD; cross rates are derived
//! from two table lookups, so adding a currency is a single `with_rate` call.

use async_trait::async_trait;
use converter_types::{CurrencyCode, ProviderError, RateProvider};
use std::collections::HashMap;

/// Base table: units of USD per one unit of the currency.
const DEFAULT_USD_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 1.087),
    ("GBP", 1.266),
    ("INR", 0.01203),
];

/// Rate provider answering from an in-memory USD-based table.
#[derive(Debug, Clone)]
pub struct StaticRateProvider {
    usd_rates: HashMap<CurrencyCode, f64>,
}

impl StaticRateProvider {
    /// Provider preloaded with USD, EUR, GBP and INR.
    pub fn new() -> Self {
        let usd_rates = DEFAULT_USD_RATES
            .iter()
            .filter_map(|(code, rate)| code.parse().ok().map(|c| (c, *rate)))
            .collect();
        Self { usd_rates }
    }

    /// Provider with an empty table.
    pub fn empty() -> Self {
        Self {
            usd_rates: HashMap::new(),
        }
    }

    /// Adds or replaces a currency; `to_usd` is the USD value of one unit.
    pub fn with_rate(mut self, code: CurrencyCode, to_usd: f64) -> Self {
        self.usd_rates.insert(code, to_usd);
        self
    }

    pub fn supports(&self, code: CurrencyCode) -> bool {
        self.usd_rates.contains_key(&code)
    }

    pub fn rate(&self, from: CurrencyCode, to: CurrencyCode) -> Option<f64> {
        if from == to {
            return Some(1.0);
        }
        let from_usd = self.usd_rates.get(&from)?;
        let to_usd = self.usd_rates.get(&to)?;
        Some(from_usd / to_usd)
    }
}

impl Default for StaticRateProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, from: CurrencyCode, to: CurrencyCode) -> Result<f64, ProviderError> {
        self.rate(from, to)
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .ok_or(ProviderError::RateNotAvailable { from, to })
    }
}
