//! Monetary amounts for report aggregation.
//!
//! Uses `rust_decimal` internally so that summing thousands of line items
//! does not accumulate binary floating-point error. Rendering rounds to two
//! decimal places with banker's rounding and inserts thousands separators.

use rust_decimal::Decimal;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Currency symbol prefixed to every rendered amount.
pub const CURRENCY_SYMBOL: char = '₹';

/// An amount of money, as a sum of `quantity * unit price` line items.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use rust_decimal::Decimal;
/// use sales_analytics::Money;
///
/// let amount = Money::new(Decimal::from_str("1234567.891").unwrap());
/// assert_eq!(amount.to_string(), "₹1,234,567.89");
/// assert_eq!(amount.grouped(), "1,234,567.89");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Number of decimal places shown when rendering.
    pub const DISPLAY_SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    /// Wraps a raw decimal amount. No rounding happens until display.
    pub fn new(value: Decimal) -> Self {
        Money(value)
    }

    /// Revenue of a single line item.
    pub fn line_total(quantity: i64, unit_price: Decimal) -> Self {
        Money(Decimal::from(quantity).saturating_mul(unit_price))
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Divides by a count, yielding zero for an empty set.
    pub fn average_over(&self, count: usize) -> Self {
        if count == 0 {
            return Money::ZERO;
        }
        Money(self.0 / Decimal::from(count))
    }

    /// Share of `total` represented by this amount, in percent.
    ///
    /// Zero when `total` is not positive.
    pub fn percent_of(&self, total: Money) -> Decimal {
        if total.0 <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.0 / total.0 * Decimal::ONE_HUNDRED
    }

    /// Renders the amount without the currency symbol, e.g. `12,345.60`.
    pub fn grouped(&self) -> String {
        format_grouped(self.0)
    }
}

/// Formats a decimal with two places and `,` between thousands groups.
pub fn format_grouped(value: Decimal) -> String {
    let rounded = value.round_dp(Money::DISPLAY_SCALE);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let digits = int_part.len();
    let mut out = String::with_capacity(plain.len() + digits / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('.');
    out.push_str(frac_part);
    out
}

/// Formats a percentage with exactly two decimal places.
pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CURRENCY_SYMBOL, self.grouped())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}
