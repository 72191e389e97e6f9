//! Exchange rate provider port.
//!
//! Implementations can be HTTP clients, fixed tables, mocks, etc.

use std::sync::Arc;

use crate::domain::CurrencyCode;
use crate::error::ProviderError;

/// Port trait for exchange rate providers.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync + 'static {
    /// Short provider name used in logs.
    fn name(&self) -> &str;

    /// Fetches how many units of `to` one unit of `from` buys.
    ///
    /// Retries, if any, happen inside the implementation. A returned rate is
    /// always finite and positive.
    async fn fetch(&self, from: CurrencyCode, to: CurrencyCode) -> Result<f64, ProviderError>;
}

#[async_trait::async_trait]
impl<P: RateProvider + ?Sized> RateProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self, from: CurrencyCode, to: CurrencyCode) -> Result<f64, ProviderError> {
        (**self).fetch(from, to).await
    }
}
