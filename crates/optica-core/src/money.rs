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
//! │  In a double-entry ledger that is fatal: debit and credit totals        │
//! │  computed along different paths stop comparing equal, and the           │
//! │  balance invariant becomes "equal within epsilon, hopefully".           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    VAT on 1,100.00 at 10% = exactly 100.00 (rounded once, explicitly)  │
//! │    Σdebit == Σcredit is integer equality, not float luck               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use optica_core::money::Money;
//!
//! // Create from cents (preferred) or whole currency units
//! let total = Money::from_major(1100); // 1,100.00
//!
//! // VAT split at 10%: vat = total * 10 / 110
//! let vat = total.vat_portion(10);
//! assert_eq!(vat, Money::from_major(100));
//! assert_eq!(total - vat, Money::from_major(1000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections and refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support so journal lines serialize cleanly
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  BusinessEvent.total ──► VAT split ──► JournalLine.debit/credit         │
/// │                                                                         │
/// │  SpendRecord.amount ──► earned_points() ──► PointTransaction.points     │
/// │                                                                         │
/// │  Promotion rule ──► discount amount ──► caller picks largest            │
/// │                                                                         │
/// │  EVERY monetary value in the ledger flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use optica_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use optica_core::money::Money;
    ///
    /// let total = Money::from_major(1000); // 1,000.00
    /// assert_eq!(total.cents(), 100_000);
    /// ```
    #[inline]
    pub const fn from_major(units: i64) -> Self {
        Money(units * 100)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit part (truncated towards zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the fractional cents part (always 0..=99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is strictly negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Extracts the VAT portion of a VAT-inclusive total.
    ///
    /// ## Formula
    /// `vat = total * rate / (100 + rate)`, rounded to the nearest cent.
    /// The revenue portion is `total - vat`, so the two always re-add to
    /// the original total and a sale entry balances exactly.
    ///
    /// ## Example
    /// ```rust
    /// use optica_core::money::Money;
    ///
    /// let total = Money::from_major(1100);
    /// assert_eq!(total.vat_portion(10), Money::from_major(100));
    /// ```
    pub fn vat_portion(&self, rate_percent: u32) -> Money {
        if rate_percent == 0 {
            return Money::zero();
        }
        let divisor = 100 + rate_percent as i128;
        // Round-half-up at the cent; i128 avoids overflow on large totals
        let vat = (self.0 as i128 * rate_percent as i128 + divisor / 2) / divisor;
        Money(vat as i64)
    }

    /// Applies a whole-percent rate and floors the result to the cent.
    ///
    /// Used by the promotion calculator; discount amounts are always
    /// floored to whole cents.
    ///
    /// ## Example
    /// ```rust
    /// use optica_core::money::Money;
    ///
    /// let total = Money::from_major(1000);
    /// assert_eq!(total.percentage(5), Money::from_major(50));
    /// ```
    pub fn percentage(&self, percent: u32) -> Money {
        let amount = (self.0 as i128 * percent as i128) / 100;
        Money(amount as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and error messages. UI formatting (locale, currency
/// symbol) happens outside this core.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations, e.g. qty × unit cost).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summation over iterators (for debit/credit column totals).
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
