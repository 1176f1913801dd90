//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The input could not be parsed as a decimal number.
    #[error("price is not a valid number")]
    NotANumber,
    /// Prices must be strictly positive.
    #[error("price must be a positive number")]
    NotPositive,
}

/// A strictly positive price in the currency's standard unit.
///
/// Prices are stored as decimals, never floats; the constructor enforces
/// positivity so a `Price` in hand is always displayable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` if the amount is zero or negative.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        Ok(Self(amount))
    }

    /// Parse a price from user input (e.g. a form field).
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotANumber` if the input is not a decimal,
    /// or `PriceError::NotPositive` if it is zero or negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::NotANumber)?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display with a dollar sign and two decimal places.
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let price = Price::parse("19.99").expect("valid price");
        assert_eq!(price.display(), "$19.99");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(Price::parse("  42 ").is_ok());
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert!(matches!(Price::parse("0"), Err(PriceError::NotPositive)));
        assert!(matches!(Price::parse("-5"), Err(PriceError::NotPositive)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Price::parse("nineteen"),
            Err(PriceError::NotANumber)
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let price = Price::parse("1299.50").expect("valid price");
        let json = serde_json::to_string(&price).expect("serialize");
        let back: Price = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, price);
    }
}
