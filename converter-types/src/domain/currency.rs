//! ISO-style three letter currency codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CodeError;

/// Canonical currency code: exactly three uppercase ASCII letters.
///
/// Only the shape is checked. Whether the code names a real currency is
/// up to the rate provider.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// Checks only the length rule (exactly three characters).
    pub fn check_length(raw: &str) -> Result<(), CodeError> {
        if raw.chars().count() != 3 {
            return Err(CodeError::Length);
        }
        Ok(())
    }

    /// Returns the code as an owned uppercase string.
    pub fn code(&self) -> String {
        self.0.iter().map(|b| *b as char).collect()
    }
}

impl FromStr for CurrencyCode {
    type Err = CodeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::check_length(raw)?;
        if !raw.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CodeError::NotAlphabetic);
        }

        let mut bytes = [0u8; 3];
        for (slot, b) in bytes.iter_mut().zip(raw.bytes()) {
            *slot = b.to_ascii_uppercase();
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.code()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            fmt::Write::write_char(f, b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyCode({})", self)
    }
}

/// Which side of a conversion a currency code was supplied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySide {
    From,
    To,
}

impl fmt::Display for CurrencySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencySide::From => write!(f, "From"),
            CurrencySide::To => write!(f, "To"),
        }
    }
}
