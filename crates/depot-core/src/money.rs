//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    price, cost, totals and profit are all i64 satang/cents.            │
//! │    No rounding is ever performed by the ledger; values keep the        │
//! │    unit and precision they were supplied with.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use depot_core::money::Money;
//!
//! let price = Money::from_cents(2500);
//! let cost = Money::from_cents(1800);
//!
//! // Profit per unit may be negative when selling below cost
//! let margin = price - cost;
//! assert_eq!(margin.cents(), 700);
//!
//! let line_total = price * 3;
//! assert_eq!(line_total.cents(), 7500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: profit may be negative when price < cost
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (cents/satang).
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the amount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the amount is negative (e.g., a loss-making margin).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a quantity, returning None on overflow.
    ///
    /// Ledger totals use this rather than bare `*` so that absurd
    /// quantity/price combinations surface as errors instead of wrapping.
    #[inline]
    pub fn checked_mul(self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Formats the amount as major.minor (e.g., 1099 → "10.99").
    ///
    /// Used by the PromptPay builder for the optional amount field, which
    /// requires exactly two decimal places.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Arithmetic Operators
// =============================================================================

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    #[inline]
    fn mul(self, qty: i64) -> Money {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        let price = Money::from_cents(2500);
        let cost = Money::from_cents(1800);

        assert_eq!((price - cost).cents(), 700);
        assert_eq!((price + cost).cents(), 4300);
        assert_eq!((price * 4).cents(), 10000);
    }

    #[test]
    fn test_negative_margin() {
        // Selling below cost yields a negative profit - allowed by design
        let price = Money::from_cents(1000);
        let cost = Money::from_cents(1500);
        let margin = price - cost;

        assert!(margin.is_negative());
        assert_eq!(margin.cents(), -500);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 50]
            .iter()
            .map(|&c| Money::from_cents(c))
            .sum();
        assert_eq!(total.cents(), 400);
    }

    #[test]
    fn test_checked_mul_overflow() {
        assert!(Money::from_cents(i64::MAX).checked_mul(2).is_none());
        assert_eq!(
            Money::from_cents(1099).checked_mul(3),
            Some(Money::from_cents(3297))
        );
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_cents(1099).to_decimal_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_decimal_string(), "5.00");
        assert_eq!(Money::from_cents(7).to_decimal_string(), "0.07");
        assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
    }
}
