//! # Money Module
//!
//! Provides the `Money` type for every monetary value that flows through the
//! consolidation layer.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing 30 days × N branches of floating point totals:                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ chart shows drift                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    API decimal "15000.50" ──► rust_decimal ──► 1500050 cents           │
//! │    Bucket sums are exact integer additions                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hotpos_core::money::Money;
//!
//! let a = Money::from_cents(1099);
//! let b = Money::from_cents(500);
//! assert_eq!((a + b).cents(), 1599);
//!
//! let total: Money = [a, b].into_iter().sum();
//! assert_eq!(total.to_string(), "15.99");
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: net profit for a month can be a loss
/// - **Serialized as cents**: the frontend formats for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount in major units.
    ///
    /// The amount is rounded to two places (half away from zero) first,
    /// so `12.345` becomes `1235` cents.
    ///
    /// ```rust
    /// use hotpos_core::money::Money;
    /// use rust_decimal::Decimal;
    /// use std::str::FromStr;
    ///
    /// let m = Money::from_decimal(Decimal::from_str("12.345").unwrap()).unwrap();
    /// assert_eq!(m.cents(), 1235);
    /// ```
    pub fn from_decimal(amount: Decimal) -> CoreResult<Self> {
        amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
            .ok_or_else(|| CoreError::AmountOutOfRange(amount.to_string()))
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

    /// Returns the amount as a float in major units.
    ///
    /// Only for ratios (growth percentages). Never sum these.
    #[inline]
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a unit quantity (e.g. stock on hand × cost price).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// Deserializes an API amount expressed in major units (`15000.5`, `"15000.50"`
/// or `null`) into `Money`. `null` and a missing field both become zero.
///
/// ```rust
/// use hotpos_core::money::{self, Money};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Row {
///     #[serde(default, deserialize_with = "money::deserialize_major")]
///     total: Money,
/// }
///
/// let row: Row = serde_json::from_str(r#"{"total": 10.99}"#).unwrap();
/// assert_eq!(row.total.cents(), 1099);
/// ```
pub fn deserialize_major<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = Option::<Decimal>::deserialize(deserializer)?;
    match amount {
        Some(amount) => Money::from_decimal(amount).map_err(serde::de::Error::custom),
        None => Ok(Money::zero()),
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain `major.minor` rendering for logs. Currency formatting is a
/// frontend concern.
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
