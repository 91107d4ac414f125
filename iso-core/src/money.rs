//! Exact monetary amounts
//!
//! Arithmetic is only defined between amounts of the same currency; there is
//! no implicit conversion. Operators therefore return `Result<Money>`.

use crate::{CurrencyCode, Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// Decimal amount paired with a currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Exact amount
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,

    /// ISO 4217 currency
    pub currency: CurrencyCode,
}

impl Money {
    /// Create a money value
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Zero in the given currency
    pub fn zero(currency: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    fn same_currency(&self, other: &Money) -> Result<()> {
        if self.currency != other.currency {
            return Err(Error::CurrencyMismatch {
                left: self.currency.to_string(),
                right: other.currency.to_string(),
            });
        }
        Ok(())
    }

    /// Sum of two amounts in the same currency
    pub fn try_add(&self, other: &Money) -> Result<Money> {
        self.same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(Error::Overflow { operation: "add" })?;
        Ok(Money::new(amount, self.currency))
    }

    /// Difference of two amounts in the same currency
    pub fn try_sub(&self, other: &Money) -> Result<Money> {
        self.same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(Error::Overflow {
                operation: "subtract",
            })?;
        Ok(Money::new(amount, self.currency))
    }

    /// Product of two amounts in the same currency
    pub fn try_mul(&self, other: &Money) -> Result<Money> {
        self.same_currency(other)?;
        self.scale(other.amount)
    }

    /// Quotient of two amounts in the same currency
    pub fn try_div(&self, other: &Money) -> Result<Money> {
        self.same_currency(other)?;
        if other.amount.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let amount = self
            .amount
            .checked_div(other.amount)
            .ok_or(Error::Overflow { operation: "divide" })?;
        Ok(Money::new(amount, self.currency))
    }

    /// Multiply by a plain factor, keeping the currency
    pub fn scale(&self, factor: Decimal) -> Result<Money> {
        let amount = self
            .amount
            .checked_mul(factor)
            .ok_or(Error::Overflow {
                operation: "multiply",
            })?;
        Ok(Money::new(amount, self.currency))
    }

    /// Compare two amounts in the same currency
    pub fn try_cmp(&self, other: &Money) -> Result<Ordering> {
        self.same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    /// Round to the currency's minor units (banker's rounding)
    pub fn round_to_minor_units(&self) -> Money {
        Money::new(
            self.amount.round_dp(self.currency.decimal_places()),
            self.currency,
        )
    }

    /// Whether the amount carries no more decimals than the currency allows
    pub fn has_valid_precision(&self) -> bool {
        self.amount.normalize().scale() <= self.currency.decimal_places()
    }
}

impl PartialOrd for Money {
    /// Amounts in different currencies are incomparable
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl Add for Money {
    type Output = Result<Money>;

    fn add(self, rhs: Money) -> Self::Output {
        self.try_add(&rhs)
    }
}

impl Sub for Money {
    type Output = Result<Money>;

    fn sub(self, rhs: Money) -> Self::Output {
        self.try_sub(&rhs)
    }
}

impl Mul for Money {
    type Output = Result<Money>;

    fn mul(self, rhs: Money) -> Self::Output {
        self.try_mul(&rhs)
    }
}

impl Div for Money {
    type Output = Result<Money>;

    fn div(self, rhs: Money) -> Self::Output {
        self.try_div(&rhs)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, CurrencyCode::new("EUR").unwrap())
    }

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, CurrencyCode::new("USD").unwrap())
    }

    #[test]
    fn test_same_currency_arithmetic() {
        assert_eq!((eur(dec!(1000.00)) + eur(dec!(500.00))).unwrap(), eur(dec!(1500.00)));
        assert_eq!((eur(dec!(1000.00)) - eur(dec!(1500.00))).unwrap(), eur(dec!(-500.00)));
        assert_eq!((eur(dec!(2.5)) * eur(dec!(4))).unwrap(), eur(dec!(10)));
        assert_eq!((eur(dec!(10)) / eur(dec!(4))).unwrap(), eur(dec!(2.5)));
    }

    #[test]
    fn test_currency_mismatch() {
        let err = (eur(dec!(1)) + usd(dec!(1))).unwrap_err();
        assert_eq!(
            err,
            Error::CurrencyMismatch {
                left: "EUR".to_string(),
                right: "USD".to_string()
            }
        );
        assert!((eur(dec!(1)) - usd(dec!(1))).is_err());
        assert!((eur(dec!(1)) * usd(dec!(1))).is_err());
        assert!((eur(dec!(1)) / usd(dec!(1))).is_err());
        assert!(eur(dec!(1)).try_cmp(&usd(dec!(1))).is_err());
    }

    #[test]
    fn test_comparisons() {
        assert!(eur(dec!(1000.00)) > eur(dec!(500.00)));
        assert!(eur(dec!(1.0)) == eur(dec!(1.00)));
        assert_eq!(eur(dec!(1)).partial_cmp(&usd(dec!(1))), None);
        assert!(!(eur(dec!(2)) > usd(dec!(1))));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            (eur(dec!(1)) / eur(dec!(0))).unwrap_err(),
            Error::DivisionByZero
        );
    }

    #[test]
    fn test_minor_units() {
        assert!(eur(dec!(10.25)).has_valid_precision());
        assert!(!eur(dec!(10.255)).has_valid_precision());
        assert!(eur(dec!(10.250)).has_valid_precision());
        let yen = Money::new(dec!(100.5), CurrencyCode::new("JPY").unwrap());
        assert_eq!(yen.round_to_minor_units().amount, dec!(100));
    }
}
