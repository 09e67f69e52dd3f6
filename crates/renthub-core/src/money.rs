//! # Money Module
//!
//! Provides the `Money` type for rental rates, deposits and booking totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Listing form: "12.50 per hour"                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price_per_hour_cents = 1250   ← stored, compared, multiplied as i64    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Booking: 3 × Per Hour  →  total = 3750 cents  →  "$37.50" in the UI    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use renthub_core::money::Money;
//!
//! let hourly = Money::from_cents(1250);
//! let total = hourly.checked_times(3).unwrap();
//! assert_eq!(total.cents(), 3750);
//! assert_eq!(total.to_string(), "$37.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use ts_rs::TS;

/// A monetary value in the smallest currency unit (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from an optional column, treating `None` as zero.
    ///
    /// Listing rates are nullable: an item may be rented per hour only,
    /// per day only, or both.
    #[inline]
    pub fn from_optional_cents(cents: Option<i64>) -> Self {
        Money(cents.unwrap_or(0))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
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

    /// Multiplies a unit rate by a rental duration.
    ///
    /// Returns `None` on overflow so a hostile duration can never wrap
    /// a booking total into a negative number.
    ///
    /// ```rust
    /// use renthub_core::money::Money;
    ///
    /// let daily = Money::from_cents(4000);
    /// assert_eq!(daily.checked_times(2), Some(Money::from_cents(8000)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_times(2), None);
    /// ```
    #[inline]
    pub fn checked_times(&self, units: i64) -> Option<Self> {
        self.0.checked_mul(units).map(Money)
    }
}

/// Debug-oriented rendering; the frontend owns localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
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
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_optional_cents_defaults_to_zero() {
        assert!(Money::from_optional_cents(None).is_zero());
        assert_eq!(Money::from_optional_cents(Some(500)).cents(), 500);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(3750).to_string(), "$37.50");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1250).to_string(), "-$12.50");
    }

    #[test]
    fn test_checked_times_overflow() {
        assert_eq!(Money::from_cents(1250).checked_times(3), Some(Money::from_cents(3750)));
        assert!(Money::from_cents(i64::MAX / 2 + 1).checked_times(2).is_none());
    }

    #[test]
    fn test_add() {
        let total = Money::from_cents(8000) + Money::from_cents(2000);
        assert_eq!(total.cents(), 10000);
    }
}
