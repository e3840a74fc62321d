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
//! │  Summing a day of sales that way drifts the drawer balance by a few    │
//! │  hundredths, and the drawer never reconciles.                          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every Money value IS a two-decimal number. Addition, subtraction    │
//! │    and quantity multiplication are exact. The only operation that can │
//! │    produce fractions of a cent (multiplying by a decimal factor)       │
//! │    rounds back to two places immediately.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fluxo_core::money::{CurrencyFormat, Money};
//!
//! let price = Money::from_cents(2500); // R$ 25,00
//! let total = price.multiply_quantity(3).add(Money::from_cents(50));
//! assert_eq!(total.cents(), 7550);
//! assert_eq!(total.format(&CurrencyFormat::brl()), "R$ 75,50");
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

/// Number of decimal places every stored amount carries.
const DECIMAL_PLACES: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents (the smallest unit of the single store currency).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate results such as `counted - expected`
///   may be negative; ledger amounts themselves are validated `>= 0`
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serializes as cents**: snapshots and the database never see floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use fluxo_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * 100)
    }

    /// Creates Money from a decimal, rounding half away from zero to two places.
    ///
    /// Values outside the `i64` cent range saturate instead of panicking.
    ///
    /// ```rust
    /// use fluxo_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let m = Money::from_decimal(Decimal::new(12345, 3)); // 12.345
    /// assert_eq!(m.cents(), 1235);
    /// ```
    pub fn from_decimal(value: Decimal) -> Self {
        let cents = (value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
            * Decimal::ONE_HUNDRED)
            .to_i64();
        match cents {
            Some(c) => Money(c),
            None if value.is_sign_negative() => Money(i64::MIN),
            None => Money(i64::MAX),
        }
    }

    /// Returns the value as an exact two-place decimal.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, DECIMAL_PLACES)
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

    /// Returns zero money value.
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

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// `a + b`, already two-decimal. Saturates instead of overflowing.
    #[inline]
    pub const fn add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// `a - b`, already two-decimal. Saturates instead of overflowing.
    #[inline]
    pub const fn subtract(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }

    /// Multiplies a unit price by an integer quantity.
    ///
    /// ```rust
    /// use fluxo_core::money::Money;
    ///
    /// let line = Money::from_cents(299).multiply_quantity(3);
    /// assert_eq!(line.cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(self, qty: i64) -> Money {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies by an arbitrary decimal factor and rounds to two places
    /// (half away from zero) before returning.
    ///
    /// ```rust
    /// use fluxo_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// // 10.00 × 0.333 = 3.33
    /// let m = Money::from_cents(1000).multiply(Decimal::new(333, 3));
    /// assert_eq!(m.cents(), 333);
    /// ```
    pub fn multiply(self, factor: Decimal) -> Money {
        match self.to_decimal().checked_mul(factor) {
            Some(product) => Money::from_decimal(product),
            None if self.is_negative() != factor.is_sign_negative() => Money(i64::MIN),
            None => Money(i64::MAX),
        }
    }

    /// Renders the value using a locale's currency convention.
    ///
    /// ```rust
    /// use fluxo_core::money::{CurrencyFormat, Money};
    ///
    /// let fmt = CurrencyFormat::brl();
    /// assert_eq!(Money::from_cents(123456).format(&fmt), "R$ 1.234,56");
    /// assert_eq!(Money::from_cents(-550).format(&fmt), "-R$ 5,50");
    /// ```
    pub fn format(&self, fmt: &CurrencyFormat) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let units = (self.0 / 100).unsigned_abs().to_string();

        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, digit) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push_str(&fmt.thousands_separator);
            }
            grouped.push(digit);
        }

        let spacing = if fmt.symbol_spacing { " " } else { "" };
        format!(
            "{}{}{}{}{}{:02}",
            sign,
            fmt.symbol,
            spacing,
            grouped,
            fmt.decimal_separator,
            self.cents_part()
        )
    }
}

// =============================================================================
// Currency Format
// =============================================================================

/// Locale currency convention used by [`Money::format`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    /// Currency symbol placed before the amount.
    pub symbol: String,

    /// Separator between units and cents.
    pub decimal_separator: String,

    /// Separator between groups of three digits.
    pub thousands_separator: String,

    /// Whether a space sits between the symbol and the digits.
    pub symbol_spacing: bool,
}

impl CurrencyFormat {
    /// Brazilian real, `pt-BR` convention: `R$ 1.234,56`.
    pub fn brl() -> Self {
        CurrencyFormat {
            symbol: "R$".to_string(),
            decimal_separator: ",".to_string(),
            thousands_separator: ".".to_string(),
            symbol_spacing: true,
        }
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat::brl()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the default (BRL) convention. UIs with a configured
/// locale should call [`Money::format`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(&CurrencyFormat::brl()))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Parses operator input such as `25`, `25.5`, `25,50` or `R$ 1.234,56`.
///
/// A comma is treated as the decimal separator when present; dots are then
/// thousands separators.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a monetary value", s.trim()),
        };

        let cleaned: String = s
            .trim()
            .trim_start_matches("R$")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let normalized = if cleaned.contains(',') {
            cleaned.replace('.', "").replace(',', ".")
        } else {
            cleaned
        };

        if normalized.is_empty() {
            return Err(invalid());
        }

        let value = Decimal::from_str(&normalized).map_err(|_| invalid())?;
        Ok(Money::from_decimal(value))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money::add(self, other)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = Money::add(*self, other);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        self.subtract(other)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = self.subtract(other);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Money::add)
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
