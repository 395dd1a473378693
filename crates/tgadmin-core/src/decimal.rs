//! Precision-safe decimal price type.
//!
//! Uses `rust_decimal` so that advertisement prices entered as text
//! ("12.50") round-trip exactly instead of drifting through `f64`.

use crate::error::{CoreError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Advertisement price with exact decimal precision.
///
/// Serialized as a JSON number; deserializes from a number or a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Parse a price typed by a user.
    ///
    /// Accepts an optional leading `$` and surrounding whitespace.
    /// The value must be a positive decimal.
    pub fn parse_input(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidPrice("price is empty".to_string()));
        }

        let value = Decimal::from_str(trimmed)
            .map_err(|e| CoreError::InvalidPrice(format!("'{trimmed}' is not a number: {e}")))?;

        let price = Self(value);
        if !price.is_positive() {
            return Err(CoreError::InvalidPrice(format!(
                "price must be greater than zero, got {value}"
            )));
        }
        Ok(price)
    }

    /// Format with two decimal places, e.g. `$12.50`.
    pub fn display_usd(&self) -> String {
        format!("${:.2}", self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + p)
    }
}
