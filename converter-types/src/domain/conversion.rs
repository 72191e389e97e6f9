//! Conversion requests, exchange rates and results.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CurrencyCode, CurrencySide};
use crate::error::{ConversionError, ValidationError};

/// Decimal places of every converted amount.
pub const CONVERTED_AMOUNT_SCALE: u32 = 2;

/// A validated conversion request.
///
/// Built per call from raw caller input and dropped once the call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRequest {
    pub amount: Decimal,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl ConversionRequest {
    /// Validates raw input, first violation wins:
    /// amount > 0, then both code lengths, then both codes alphabetic.
    pub fn validate(amount: Decimal, from: &str, to: &str) -> Result<Self, ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }

        CurrencyCode::check_length(from)
            .map_err(|e| ValidationError::currency(CurrencySide::From, e))?;
        CurrencyCode::check_length(to)
            .map_err(|e| ValidationError::currency(CurrencySide::To, e))?;

        let from = parse_side(CurrencySide::From, from)?;
        let to = parse_side(CurrencySide::To, to)?;

        Ok(Self { amount, from, to })
    }

    /// Identity conversions never touch the cache or the provider.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

/// Parses a currency code supplied for one side of a conversion.
pub fn parse_side(side: CurrencySide, raw: &str) -> Result<CurrencyCode, ValidationError> {
    raw.parse().map_err(|e| ValidationError::currency(side, e))
}

/// Units of `to` obtained for one unit of `from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRate {
    #[schema(value_type = String, example = "USD")]
    pub from: CurrencyCode,
    #[schema(value_type = String, example = "EUR")]
    pub to: CurrencyCode,
    #[schema(example = 0.85)]
    pub value: f64,
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn new(from: CurrencyCode, to: CurrencyCode, value: f64) -> Self {
        Self {
            from,
            to,
            value,
            fetched_at: Utc::now(),
        }
    }

    /// The rate of a currency against itself.
    pub fn identity(code: CurrencyCode) -> Self {
        Self::new(code, code, 1.0)
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversionResult {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 100.0)]
    pub amount: Decimal,
    #[schema(value_type = String, example = "USD")]
    pub from_currency: CurrencyCode,
    #[schema(value_type = String, example = "EUR")]
    pub to_currency: CurrencyCode,
    #[schema(example = 0.85)]
    pub exchange_rate: f64,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 85.0)]
    pub converted_amount: Decimal,
}

impl ConversionResult {
    /// Applies `rate` to the request amount, rounding half-up to two places.
    pub fn from_rate(
        request: &ConversionRequest,
        rate: &ExchangeRate,
    ) -> Result<Self, ConversionError> {
        let converted_amount = convert_amount(request.amount, rate.value)?;
        Ok(Self {
            amount: request.amount,
            from_currency: request.from,
            to_currency: request.to,
            exchange_rate: rate.value,
            converted_amount,
        })
    }
}

/// `round(amount * rate, 2, half-up)`.
pub fn convert_amount(amount: Decimal, rate: f64) -> Result<Decimal, ConversionError> {
    let rate = Decimal::from_f64(rate)
        .ok_or_else(|| ConversionError::Internal(format!("rate {} is not representable", rate)))?;

    amount
        .checked_mul(rate)
        .map(|v| {
            v.round_dp_with_strategy(
                CONVERTED_AMOUNT_SCALE,
                RoundingStrategy::MidpointAwayFromZero,
            )
        })
        .ok_or_else(|| ConversionError::Internal("converted amount overflow".into()))
}
