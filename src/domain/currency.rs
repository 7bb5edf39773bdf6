//! Currency type
//!
//! Domain primitive for the currency an account is held in.
//! Parsing is the only way to obtain a `Currency`, so an unsupported
//! code cannot reach the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported ISO-4217 currency codes.
///
/// # Example
/// ```
/// use simple_bank::domain::Currency;
///
/// let currency: Currency = "USD".parse().unwrap();
/// assert_eq!(currency.as_str(), "USD");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    Usd,
    Eur,
    Cad,
}

/// Errors that can occur when parsing a Currency
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurrencyError {
    #[error("Unsupported currency: {0}")]
    Unsupported(String),
}

impl Currency {
    /// All currencies an account may be opened in.
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Eur, Currency::Cad];

    /// Three-letter code as stored in the `accounts.currency` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Cad => "CAD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "CAD" => Ok(Currency::Cad),
            other => Err(CurrencyError::Unsupported(other.to_string())),
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::from_str(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.as_str().to_string()
    }
}
