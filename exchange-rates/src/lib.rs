//! # Exchange Rates
//!
//! Outbound side of the rate resolution pipeline:
//!
//! - [`RateCache`] - TTL cache with at-most-one in-flight computation per key
//! - [`HttpRateProvider`] - REST rate provider with bounded retries
//! - [`StaticRateProvider`] - fixed USD-based table for local development
//!
//! # Example
//! ```no_run
//! use exchange_rates::{HttpRateProvider, HttpRateProviderConfig, RateCache, cache_key};
//! use converter_types::RateProvider;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = HttpRateProvider::new(HttpRateProviderConfig::default())?;
//! let cache = RateCache::<f64>::new(Duration::from_secs(3600));
//!
//! let (usd, eur) = ("USD".parse()?, "EUR".parse()?);
//! let rate = cache
//!     .get_or_compute(&cache_key(usd, eur), || provider.fetch(usd, eur))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod fixed;
pub mod http;

pub use cache::{Clock, ManualClock, RateCache, SharedRateCache, SystemClock, cache_key};
pub use fixed::StaticRateProvider;
pub use http::{HttpRateProvider, HttpRateProviderConfig};
