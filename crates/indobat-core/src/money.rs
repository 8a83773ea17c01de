//! # Money Module
//!
//! Provides the `Money` type for prices and totals, and `DiscountRate` for
//! the per-order discount.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A ledger summed over thousands of sales drifts by whole cents.         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    price 100.00 → 10000 cents, 3 units at 10% off → 27000 cents        │
//! │    Every stored total is exact; rounding happens once, explicitly      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use indobat_core::money::{DiscountRate, Money};
//!
//! let price = Money::from_cents(1099); // 10.99
//! let subtotal = price.checked_multiply_quantity(3).unwrap();
//! let discount = subtotal.discount_amount(DiscountRate::from_bps(1000)); // 10%
//!
//! assert_eq!(subtotal.cents(), 3297);
//! assert_eq!(discount.cents(), 330);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Differences (e.g. `subtotal - discount`) stay in-type
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serializes as a bare integer**: `{"price_cents": 1099}`
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──► PriceQuote.subtotal ──► PriceQuote.total
///                                   │                    │
///                                   ▼                    ▼
///                         LedgerEntry.unit_price   LedgerEntry.total_price
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use indobat_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies money by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use indobat_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.checked_multiply_quantity(3).unwrap().cents(), 897);
    /// assert!(Money::from_cents(i64::MAX).checked_multiply_quantity(2).is_none());
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Returns the amount taken off by `rate`, rounded half up to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5). Intended for the
    /// non-negative subtotals the order engine produces.
    ///
    /// ## Example
    /// ```rust
    /// use indobat_core::money::{DiscountRate, Money};
    ///
    /// let subtotal = Money::from_cents(30_000);
    /// assert_eq!(subtotal.discount_amount(DiscountRate::from_bps(1000)).cents(), 3_000);
    /// assert_eq!(subtotal.discount_amount(DiscountRate::FULL).cents(), 30_000);
    /// ```
    pub fn discount_amount(&self, rate: DiscountRate) -> Money {
        // i128 keeps amount * 10000 from overflowing on large subtotals
        let discount = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(discount as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as `major.minor`, e.g. `270.00`. Debugging and CLI output only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount represented in basis points (bps).
///
/// 1 basis point = 0.01%, so the valid range 0..=10000 covers 0%..=100%.
/// Callers speak in percent (`discount_percent: 12.5`); the ledger stores
/// basis points so the value round-trips exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Largest valid rate in basis points (100%).
    pub const MAX_BPS: u32 = 10_000;

    /// No discount.
    pub const NONE: DiscountRate = DiscountRate(0);

    /// 100% off.
    pub const FULL: DiscountRate = DiscountRate(Self::MAX_BPS);

    /// Creates a rate from basis points, clamping to 100%.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > Self::MAX_BPS {
            DiscountRate(Self::MAX_BPS)
        } else {
            DiscountRate(bps)
        }
    }

    /// Creates a rate from a percentage in `[0, 100]`.
    ///
    /// Fractions below one basis point are rounded half up.
    ///
    /// ## Example
    /// ```rust
    /// use indobat_core::money::DiscountRate;
    ///
    /// assert_eq!(DiscountRate::from_percent(12.5).unwrap().bps(), 1250);
    /// assert!(DiscountRate::from_percent(100.5).is_err());
    /// assert!(DiscountRate::from_percent(f64::NAN).is_err());
    /// ```
    pub fn from_percent(pct: f64) -> ValidationResult<Self> {
        if !pct.is_finite() {
            return Err(ValidationError::InvalidFormat {
                field: "discount_percent".to_string(),
                reason: "must be a finite number".to_string(),
            });
        }

        if !(0.0..=100.0).contains(&pct) {
            return Err(ValidationError::OutOfRange {
                field: "discount_percent".to_string(),
                min: 0,
                max: 100,
            });
        }

        Ok(DiscountRate((pct * 100.0).round() as u32))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
