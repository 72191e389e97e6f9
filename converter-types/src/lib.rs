//! # Converter Types
//!
//! Domain types and port traits for the currency conversion service.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, ExchangeRate, MeasurementRecord)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Validation, provider and service error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    ConversionRequest, ConversionResult, CurrencyCode, CurrencySide, ExchangeRate, FieldValue,
    MeasurementRecord,
};
pub use dto::*;
pub use error::{CacheComputationError, CodeError, ConversionError, ProviderError, ValidationError};
pub use ports::{MetricsEmitter, RateProvider};
