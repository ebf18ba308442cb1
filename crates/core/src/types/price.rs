//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are unit prices in the shop's single currency. Multi-currency is not
//! supported; the currency symbol is a display concern supplied by the caller.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input string is not a decimal number.
    #[error("price is not a valid number: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative unit price.
///
/// ## Examples
///
/// ```
/// use uniform_shop_core::Price;
///
/// let price = Price::parse("10.50").unwrap();
/// assert_eq!(price.display("₹"), "₹10.50");
///
/// assert!(Price::parse("-1").is_err());
/// assert!(Price::parse("").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of minor units (e.g. paise).
    #[must_use]
    pub fn from_minor_units(units: u32) -> Self {
        Self(Decimal::new(i64::from(units), 2))
    }

    /// Parse a price from user input such as an admin form field.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not a number, or negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }
        let amount =
            Decimal::from_str(trimmed).map_err(|_| PriceError::Invalid(trimmed.to_owned()))?;
        Self::new(amount)
    }

    /// The amount as a decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The line total for `quantity` units at this price.
    ///
    /// Returns `None` if the product does not fit in a `Decimal`.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Option<Decimal> {
        self.0.checked_mul(Decimal::from(quantity))
    }

    /// Format for display with two decimal places (e.g. "₹19.99").
    #[must_use]
    pub fn display(&self, symbol: &str) -> String {
        format_amount(self.0, symbol)
    }
}

/// Format a decimal amount for display with two decimal places.
#[must_use]
pub fn format_amount(amount: Decimal, symbol: &str) -> String {
    format!("{symbol}{:.2}", amount.round_dp(2))
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

// Deserialization goes through `new` so a negative amount never becomes a `Price`.
impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Price::parse("10").unwrap().amount(), Decimal::new(10, 0));
        assert_eq!(Price::parse(" 4.99 ").unwrap().amount(), Decimal::new(499, 2));
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Price::parse("   "), Err(PriceError::Empty));
        assert!(matches!(Price::parse("ten"), Err(PriceError::Invalid(_))));
        assert!(matches!(Price::parse("-0.01"), Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_negative_zero_is_allowed() {
        let neg_zero = -Decimal::ZERO;
        assert!(Price::new(neg_zero).is_ok());
    }

    #[test]
    fn test_times() {
        let price = Price::parse("10.00").unwrap();
        assert_eq!(price.times(3), Some(Decimal::new(3000, 2)));
        assert_eq!(price.times(0), Some(Decimal::ZERO));
        assert_eq!(Price::new(Decimal::MAX).unwrap().times(2), None);
    }

    #[test]
    fn test_display() {
        let price = Price::from_minor_units(2999);
        assert_eq!(price.display("₹"), "₹29.99");
        assert_eq!(price.to_string(), "29.99");
        assert_eq!(Price::parse("7").unwrap().display("₹"), "₹7.00");
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        let ok: Price = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(ok.amount(), Decimal::new(1250, 2));

        let err = serde_json::from_str::<Price>("\"-3\"");
        assert!(err.is_err());
    }
}
