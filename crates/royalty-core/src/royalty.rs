//! # Royalty Calculator
//!
//! `royalty = amount × percentage / 100`, computed on integer cents.
//!
//! ## Precision Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Percentages are stored as basis points (1/100 of a percent):          │
//! │     15%    → 1500 bps                                                  │
//! │     12.5%  → 1250 bps                                                  │
//! │     100%   → 10000 bps                                                 │
//! │                                                                         │
//! │  Royalties are rounded to 2 decimal places, HALF UP:                   │
//! │     amount 0.05 at 10%  = 0.005  → 0.01                                │
//! │     amount 0.04 at 10%  = 0.004  → 0.00                                │
//! │                                                                         │
//! │  Rounding happens exactly once per sale. Every rollup afterwards is    │
//! │  an exact integer sum.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// Upper bound for a royalty rate: 100%.
pub const MAX_ROYALTY_BPS: u32 = 10_000;

// =============================================================================
// Royalty Rate
// =============================================================================

/// Royalty percentage in basis points, guaranteed to lie in `[0, 10000]`.
///
/// Serialized as the bare basis-point integer; deserialization re-checks
/// the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RoyaltyRate(u32);

impl RoyaltyRate {
    /// Creates a rate from basis points.
    pub fn from_bps(bps: u32) -> CoreResult<Self> {
        if bps > MAX_ROYALTY_BPS {
            return Err(CoreError::invalid(format!(
                "royalty percentage must be between 0 and 100, got {}.{:02}",
                bps / 100,
                bps % 100
            )));
        }
        Ok(RoyaltyRate(bps))
    }

    /// Creates a rate from a percentage such as `15.0` or `12.5`.
    ///
    /// The percentage is rounded to two decimal places.
    pub fn from_percentage(pct: f64) -> CoreResult<Self> {
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(CoreError::invalid(format!(
                "royalty percentage must be between 0 and 100, got {}",
                pct
            )));
        }
        Self::from_bps((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (display and averages only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl TryFrom<u32> for RoyaltyRate {
    type Error = CoreError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        RoyaltyRate::from_bps(bps)
    }
}

impl From<RoyaltyRate> for u32 {
    fn from(rate: RoyaltyRate) -> Self {
        rate.0
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes the royalty earned on a sale.
///
/// ## Errors
/// `InvalidArgument` when `amount` is negative. The rate is range-checked at
/// construction, so any `RoyaltyRate` value is acceptable here.
///
/// ## Example
/// ```rust
/// use royalty_core::money::Money;
/// use royalty_core::royalty::{compute_royalty, RoyaltyRate};
///
/// let royalty = compute_royalty(
///     Money::from_cents(100_000),
///     RoyaltyRate::from_percentage(10.0).unwrap(),
/// ).unwrap();
/// assert_eq!(royalty.cents(), 10_000);
/// ```
pub fn compute_royalty(amount: Money, rate: RoyaltyRate) -> CoreResult<Money> {
    if amount.is_negative() {
        return Err(CoreError::invalid(format!(
            "sale amount must not be negative, got {}",
            amount
        )));
    }

    Ok(amount.apply_bps(rate.bps()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(p: f64) -> RoyaltyRate {
        RoyaltyRate::from_percentage(p).unwrap()
    }

    #[test]
    fn test_thousand_at_ten_percent() {
        let royalty = compute_royalty(Money::from_major_minor(1000, 0), pct(10.0)).unwrap();
        assert_eq!(royalty, Money::from_major_minor(100, 0));
    }

    #[test]
    fn test_three_hundred_at_fifteen_percent() {
        let royalty = compute_royalty(Money::from_major_minor(300, 0), pct(15.0)).unwrap();
        assert_eq!(royalty.cents(), 4500);
    }

    #[test]
    fn test_linear_in_amount() {
        let rate = pct(12.5);
        let one = compute_royalty(Money::from_cents(8000), rate).unwrap();
        let three = compute_royalty(Money::from_cents(24000), rate).unwrap();
        assert_eq!(three.cents(), one.cents() * 3);
    }

    #[test]
    fn test_monotonic_in_percentage() {
        let amount = Money::from_cents(123_457);
        let mut previous = Money::zero();
        for bps in (0..=MAX_ROYALTY_BPS).step_by(37) {
            let royalty = compute_royalty(amount, RoyaltyRate::from_bps(bps).unwrap()).unwrap();
            assert!(royalty >= previous, "royalty decreased at {} bps", bps);
            previous = royalty;
        }
    }

    #[test]
    fn test_bounds() {
        assert_eq!(
            compute_royalty(Money::from_cents(5000), pct(0.0)).unwrap(),
            Money::zero()
        );
        assert_eq!(
            compute_royalty(Money::from_cents(5000), pct(100.0)).unwrap(),
            Money::from_cents(5000)
        );
    }

    #[test]
    fn test_rejects_negative_amount() {
        let err = compute_royalty(Money::from_cents(-1), pct(10.0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_out_of_range_percentage() {
        assert!(RoyaltyRate::from_percentage(-0.5).is_err());
        assert!(RoyaltyRate::from_percentage(100.01).is_err());
        assert!(RoyaltyRate::from_percentage(f64::NAN).is_err());
        assert!(RoyaltyRate::from_bps(10_001).is_err());
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(pct(12.5).bps(), 1250);
        assert_eq!(pct(7.125).bps(), 713);
        assert!((pct(15.0).percentage() - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serde_rejects_invalid_bps() {
        let ok: RoyaltyRate = serde_json::from_str("1500").unwrap();
        assert_eq!(ok.bps(), 1500);
        assert!(serde_json::from_str::<RoyaltyRate>("20000").is_err());
    }
}
