// Money
//
// Currency-tagged decimal amounts. Arithmetic refuses to mix currencies and
// rounds multiplication/division to the currency's minor units, so applying
// the same discount twice always yields the same cents.

use crate::error::{DomainError, DomainResult};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Currency unit of a [`Money`] amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// South Korean won, no minor units
    Krw,
    /// Japanese yen, no minor units
    Jpy,
    /// US dollar, cents
    Usd,
    /// Euro, cents
    Eur,
}

impl Currency {
    /// Number of decimal places amounts are rounded to
    pub fn minor_units(&self) -> u32 {
        match self {
            Currency::Krw | Currency::Jpy => 0,
            Currency::Usd | Currency::Eur => 2,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Krw => "KRW",
            Currency::Jpy => "JPY",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "KRW" => Ok(Currency::Krw),
            "JPY" => Ok(Currency::Jpy),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}

/// A non-negative amount of a single currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyRepr")]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

#[derive(Deserialize)]
struct MoneyRepr {
    amount: Decimal,
    currency: Currency,
}

impl TryFrom<MoneyRepr> for Money {
    type Error = DomainError;

    fn try_from(repr: MoneyRepr) -> Result<Self, Self::Error> {
        Money::new(repr.amount, repr.currency)
    }
}

impl Money {
    /// Create a money value, rounding to the currency's minor units
    ///
    /// Negative amounts are rejected.
    pub fn new(amount: Decimal, currency: Currency) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::InvalidAmount(format!(
                "money amount must not be negative, got {}",
                amount
            )));
        }
        Ok(Self {
            amount: round(amount, currency),
            currency,
        })
    }

    /// Whole units of a currency (e.g. `Money::of(10000, Currency::Krw)`)
    pub fn of(units: u64, currency: Currency) -> Self {
        Self {
            amount: Decimal::from(units),
            currency,
        }
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Fail with `CurrencyMismatch` unless both values share a currency
    pub fn ensure_same_currency(&self, other: &Money) -> DomainResult<()> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }

    pub fn add(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        Ok(Self {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// Subtract, failing if the result would be negative
    pub fn subtract(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        let amount = self.amount - other.amount;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::InvalidAmount(format!(
                "subtracting {} from {} would be negative",
                other, self
            )));
        }
        Ok(Self {
            amount,
            currency: self.currency,
        })
    }

    /// Subtract, clamping the result at zero
    pub fn saturating_sub(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        Ok(Self {
            amount: (self.amount - other.amount).max(Decimal::ZERO),
            currency: self.currency,
        })
    }

    /// Multiply by a non-negative factor, rounding to minor units
    pub fn multiply(&self, factor: Decimal) -> DomainResult<Money> {
        if factor.is_sign_negative() && !factor.is_zero() {
            return Err(DomainError::InvalidAmount(format!(
                "multiplication factor must not be negative, got {}",
                factor
            )));
        }
        Ok(Self {
            amount: round(self.amount * factor, self.currency),
            currency: self.currency,
        })
    }

    /// Divide by a positive divisor, rounding to minor units
    pub fn divide(&self, divisor: Decimal) -> DomainResult<Money> {
        if divisor.is_zero() {
            return Err(DomainError::DivisionByZero);
        }
        if divisor.is_sign_negative() {
            return Err(DomainError::InvalidAmount(format!(
                "divisor must be positive, got {}",
                divisor
            )));
        }
        Ok(Self {
            amount: round(self.amount / divisor, self.currency),
            currency: self.currency,
        })
    }

    /// The smaller of two amounts of the same currency
    pub fn min(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        Ok(if other.amount < self.amount { *other } else { *self })
    }

    /// The larger of two amounts of the same currency
    pub fn max(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        Ok(if other.amount > self.amount { *other } else { *self })
    }
}

fn round(amount: Decimal, currency: Currency) -> Decimal {
    amount.round_dp_with_strategy(currency.minor_units(), RoundingStrategy::MidpointAwayFromZero)
}

// Different currencies are unordered.
impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        self.amount.partial_cmp(&other.amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self.amount;
        amount.rescale(self.currency.minor_units());
        write!(f, "{} {}", amount, self.currency)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Multiplying by a factor in [0, 1] never increases the amount
    #[test]
    fn prop_multiply_by_fraction_never_increases() {
        proptest!(|(
            cents in 0u64..=10_000_000u64,
            percent in 0u32..=100u32
        )| {
            let price = Money::new(Decimal::from(cents) / Decimal::from(100), Currency::Usd).unwrap();
            let factor = Decimal::from(percent) / Decimal::from(100);
            let result = price.multiply(factor).unwrap();

            prop_assert!(result <= price);
            prop_assert!(result.amount() >= Decimal::ZERO);
        });
    }

    /// Saturating subtraction is never negative
    #[test]
    fn prop_saturating_sub_is_non_negative() {
        proptest!(|(
            a in 0u64..=1_000_000u64,
            b in 0u64..=1_000_000u64
        )| {
            let left = Money::of(a, Currency::Krw);
            let right = Money::of(b, Currency::Krw);
            let result = left.saturating_sub(&right).unwrap();

            prop_assert!(result.amount() >= Decimal::ZERO);
            prop_assert!(result <= left);
        });
    }
}
