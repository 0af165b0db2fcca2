//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing royalties as floats:                                           │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │    A monthly rollup of thousands of sales drifts by fractions of a cent │
//! │    and two recomputations of the same month can disagree.               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every royalty is rounded ONCE, when the sale is recorded.            │
//! │    Every later sum is exact, so Earning rollups are reproducible.       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use royalty_core::money::Money;
//!
//! let amount = Money::from_cents(30000); // 300.00
//! let total = amount + Money::from_cents(4500);
//! assert_eq!(total.cents(), 34500);
//! assert_eq!(total.to_decimal_string(), "345.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Where Money Flows
/// ```text
/// Sale.amount ──► compute_royalty ──► Sale.royalty ──┬──► Book.royalty_earned
///                                                    │
///                                                    └──► Earning.royalty_earned
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole units and cents.
    ///
    /// ```rust
    /// use royalty_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(12, 5).cents(), 1205);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Applies a rate in basis points, rounding half up to the nearest cent.
    ///
    /// ## Implementation
    /// Integer math on i128: `(cents * bps + 5000) / 10000`.
    /// For negative values the rounding offset is mirrored so that the
    /// result is symmetric around zero.
    ///
    /// ```rust
    /// use royalty_core::money::Money;
    ///
    /// // 10.00 at 8.25% = 0.825 → 0.83
    /// assert_eq!(Money::from_cents(1000).apply_bps(825).cents(), 83);
    /// ```
    pub fn apply_bps(&self, bps: u32) -> Money {
        let product = self.0 as i128 * bps as i128;
        let rounded = if product >= 0 {
            (product + 5000) / 10000
        } else {
            (product - 5000) / 10000
        };
        Money::from_cents(rounded as i64)
    }

    /// Formats as a plain decimal with two places, e.g. `"300.00"`.
    ///
    /// Used by the CSV export where a currency symbol would break spreadsheets.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.units(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_cents(30000).to_decimal_string(), "300.00");
        assert_eq!(Money::from_cents(4505).to_decimal_string(), "45.05");
        assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_apply_bps_rounds_half_up() {
        // 0.01 at 50% = 0.005 → 0.01
        assert_eq!(Money::from_cents(1).apply_bps(5000).cents(), 1);
        // 0.01 at 49.99% = 0.004999 → 0.00
        assert_eq!(Money::from_cents(1).apply_bps(4999).cents(), 0);
        // Symmetric for negatives
        assert_eq!(Money::from_cents(-1).apply_bps(5000).cents(), -1);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 5]
            .iter()
            .map(|c| Money::from_cents(*c))
            .sum();
        assert_eq!(total.cents(), 355);
    }
}
