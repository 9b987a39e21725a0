//! Type-safe price representation.
//!
//! The catalog stores prices as whole Bangladeshi Taka - there is no
//! fractional display anywhere in the shop, so the amount is a plain
//! integer rather than a decimal.

use serde::{Deserialize, Serialize};

/// A price in whole taka.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Zero taka.
    pub const ZERO: Self = Self(0);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the amount in whole taka.
    #[must_use]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Multiply by a quantity, saturating at the numeric bounds.
    #[must_use]
    pub const fn saturating_mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }

    /// Add another price, saturating at the numeric bounds.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "৳ {}", self.0)
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_taka_sign() {
        assert_eq!(Price::new(1250).to_string(), "৳ 1250");
        assert_eq!(Price::ZERO.to_string(), "৳ 0");
    }

    #[test]
    fn test_saturating_mul() {
        assert_eq!(Price::new(1250).saturating_mul(3), Price::new(3750));
        assert_eq!(Price::new(i64::MAX).saturating_mul(2), Price::new(i64::MAX));
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::new(100), Price::new(250)].into_iter().sum();
        assert_eq!(total, Price::new(350));
    }

    #[test]
    fn test_serde_transparent() {
        let price = Price::new(60);
        assert_eq!(serde_json::to_string(&price).unwrap(), "60");
        let parsed: Price = serde_json::from_str("60").unwrap();
        assert_eq!(parsed, price);
    }
}
