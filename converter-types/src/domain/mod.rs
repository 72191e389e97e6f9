//! Domain models for the conversion service.

pub mod conversion;
pub mod currency;
pub mod measurement;

pub use conversion::{ConversionRequest, ConversionResult, ExchangeRate};
pub use currency::{CurrencyCode, CurrencySide};
pub use measurement::{FieldValue, MeasurementRecord};
