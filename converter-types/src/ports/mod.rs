//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod metrics;
mod rates;

pub use metrics::MetricsEmitter;
pub use rates::RateProvider;
