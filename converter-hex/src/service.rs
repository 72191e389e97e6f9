//! Conversion Application Service
//!
//! Orchestrates validation, rate resolution and metrics through the ports.
//! Contains NO infrastructure logic - the provider and emitter are injected.

use std::sync::Arc;
use std::time::Instant;

use converter_types::{
    ConversionError, ConversionRequest, ConversionResult, CurrencySide, ExchangeRate,
    MeasurementRecord, MetricsEmitter, RateProvider, domain::conversion::parse_side,
};
use exchange_rates::{RateCache, cache_key};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, error, info, instrument, warn};

/// Measurement written once per `convert` call.
pub const MEASUREMENT: &str = "currency_conversion";

/// Outcome tag of a conversion measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStatus {
    Success,
    /// The rate provider could not supply a rate.
    Failed,
    /// Rejected before any rate lookup.
    Invalid,
    /// Unexpected internal failure.
    Error,
}

impl ConversionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionStatus::Success => "success",
            ConversionStatus::Failed => "failed",
            ConversionStatus::Invalid => "invalid",
            ConversionStatus::Error => "error",
        }
    }

    fn of(err: &ConversionError) -> Self {
        match err {
            ConversionError::Validation(_) => ConversionStatus::Invalid,
            ConversionError::RateUnavailable(_) => ConversionStatus::Failed,
            ConversionError::Internal(_) => ConversionStatus::Error,
        }
    }
}

/// Application service for currency conversion.
///
/// Generic over the provider and the emitter; both are injected at compile time.
/// The rate cache is shared, so several services (or tests) can point at one.
pub struct ConversionService<P: RateProvider, M: MetricsEmitter> {
    provider: P,
    cache: Arc<RateCache<ExchangeRate>>,
    metrics: M,
}

impl<P: RateProvider, M: MetricsEmitter> ConversionService<P, M> {
    pub fn new(provider: P, cache: Arc<RateCache<ExchangeRate>>, metrics: M) -> Self {
        Self {
            provider,
            cache,
            metrics,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    pub fn cache(&self) -> &RateCache<ExchangeRate> {
        &self.cache
    }

    /// Converts `amount` of `from` into `to`.
    ///
    /// Emits exactly one measurement, whatever the outcome.
    #[instrument(skip(self, amount), fields(amount = %amount))]
    pub async fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<ConversionResult, ConversionError> {
        let started = Instant::now();
        let outcome = self.convert_inner(amount, from, to).await;
        let duration_ms = started.elapsed().as_millis() as i64;

        match &outcome {
            Ok(result) => {
                info!(
                    from = %result.from_currency,
                    to = %result.to_currency,
                    rate = result.exchange_rate,
                    converted = %result.converted_amount,
                    duration_ms,
                    "Conversion completed"
                );
                self.metrics.emit(success_record(result, duration_ms));
            }
            Err(e) => {
                let status = ConversionStatus::of(e);
                match status {
                    ConversionStatus::Invalid => debug!(error = %e, "Conversion rejected"),
                    ConversionStatus::Failed => warn!(error = %e, duration_ms, "Rate unavailable"),
                    _ => error!(error = %e, duration_ms, "Conversion failed"),
                }
                self.metrics
                    .emit(failure_record(from, to, status, e, duration_ms));
            }
        }

        outcome
    }

    async fn convert_inner(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<ConversionResult, ConversionError> {
        let request = ConversionRequest::validate(amount, from, to)?;

        let rate = if request.is_identity() {
            debug!(currency = %request.from, "Identity conversion");
            ExchangeRate::identity(request.from)
        } else {
            self.resolve_rate(&request).await?
        };

        ConversionResult::from_rate(&request, &rate)
    }

    /// Looks up the current rate for a pair. No metrics are emitted.
    #[instrument(skip(self))]
    pub async fn get_exchange_rate(
        &self,
        from: &str,
        to: &str,
    ) -> Result<ExchangeRate, ConversionError> {
        let from = parse_side(CurrencySide::From, from)?;
        let to = parse_side(CurrencySide::To, to)?;

        if from == to {
            return Ok(ExchangeRate::identity(from));
        }

        let request = ConversionRequest {
            amount: Decimal::ONE,
            from,
            to,
        };
        self.resolve_rate(&request).await
    }

    async fn resolve_rate(
        &self,
        request: &ConversionRequest,
    ) -> Result<ExchangeRate, ConversionError> {
        let (from, to) = (request.from, request.to);
        let key = cache_key(from, to);
        let provider = &self.provider;

        let rate = self
            .cache
            .get_or_compute(&key, || async move {
                debug!(provider = provider.name(), %from, %to, "Fetching rate from provider");
                provider
                    .fetch(from, to)
                    .await
                    .map(|value| ExchangeRate::new(from, to, value))
            })
            .await?;

        Ok(rate)
    }
}

fn success_record(result: &ConversionResult, duration_ms: i64) -> MeasurementRecord {
    MeasurementRecord::new(MEASUREMENT)
        .tag("from", result.from_currency.code())
        .tag("to", result.to_currency.code())
        .tag("status", ConversionStatus::Success.as_str())
        .field_opt("amount", result.amount.to_f64())
        .field("duration_ms", duration_ms)
        .field("exchange_rate", result.exchange_rate)
        .field_opt("converted_amount", result.converted_amount.to_f64())
}

fn failure_record(
    from: &str,
    to: &str,
    status: ConversionStatus,
    err: &ConversionError,
    duration_ms: i64,
) -> MeasurementRecord {
    let reason = match err {
        ConversionError::RateUnavailable(e) => e.source.to_string(),
        other => other.to_string(),
    };

    // Only codes that parse are tagged; raw input never reaches the line.
    let from = parse_side(CurrencySide::From, from).ok().map(|c| c.code());
    let to = parse_side(CurrencySide::To, to).ok().map(|c| c.code());

    MeasurementRecord::new(MEASUREMENT)
        .tag_opt("from", from)
        .tag_opt("to", to)
        .tag("status", status.as_str())
        .field("duration_ms", duration_ms)
        .field("error", reason)
}
