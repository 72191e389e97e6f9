//! Error types for the conversion service.

use crate::domain::{CurrencyCode, CurrencySide};

/// Why a raw string is not a currency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    #[error("must be 3 characters")]
    Length,

    #[error("must contain only letters")]
    NotAlphabetic,
}

/// Caller-correctable input errors. Never retried, never sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    #[error("{side} currency {reason}")]
    InvalidCurrency {
        side: CurrencySide,
        reason: CodeError,
    },
}

impl ValidationError {
    pub fn currency(side: CurrencySide, reason: CodeError) -> Self {
        ValidationError::InvalidCurrency { side, reason }
    }
}

/// Rate provider failures (transport, status, response body).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("Rate provider request failed: {0}")]
    Transport(String),

    #[error("Rate provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Exchange rate not found in response")]
    RateNotFound,

    #[error("Malformed rate provider response: {0}")]
    Malformed(String),

    #[error("Rate not available for {from} -> {to}")]
    RateNotAvailable { from: CurrencyCode, to: CurrencyCode },
}

/// A provider failure raised while populating a cache key.
///
/// The key is left without an entry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{source}")]
pub struct CacheComputationError {
    pub key: String,
    #[source]
    pub source: ProviderError,
}

/// Errors returned by the conversion service.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to fetch exchange rate: {0}")]
    RateUnavailable(#[from] CacheComputationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_unavailable_message_carries_provider_cause() {
        let err = ConversionError::from(CacheComputationError {
            key: "rate:USD:EUR".into(),
            source: ProviderError::RateNotFound,
        });
        assert_eq!(
            err.to_string(),
            "Failed to fetch exchange rate: Exchange rate not found in response"
        );
    }

    #[test]
    fn test_validation_is_transparent() {
        let err = ConversionError::from(ValidationError::NonPositiveAmount);
        assert_eq!(err.to_string(), "Amount must be greater than 0");
    }
}
