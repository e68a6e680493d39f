// Engine settings
//
// Read from the process environment after loading `.env`. Unset variables
// fall back to defaults; set but malformed ones are errors.

use crate::error::{DomainError, DomainResult};
use crate::metrics::DEFAULT_SLOW_OPERATION_THRESHOLD_MS;
use crate::types::{CombinationStrategy, PolicyLevel};
use crate::values::{Currency, Money};
use rust_decimal::Decimal;
use std::str::FromStr;

pub const CURRENCY_VAR: &str = "RESERVATION_CURRENCY";
pub const MAX_TOTAL_DISCOUNT_VAR: &str = "RESERVATION_MAX_TOTAL_DISCOUNT";
pub const MINIMUM_PRICE_VAR: &str = "RESERVATION_MINIMUM_PRICE";
pub const ELIGIBILITY_LEVEL_VAR: &str = "RESERVATION_ELIGIBILITY_LEVEL";
pub const DISCOUNT_STRATEGY_VAR: &str = "RESERVATION_DISCOUNT_STRATEGY";
pub const SLOW_THRESHOLD_VAR: &str = "RESERVATION_SLOW_THRESHOLD_MS";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub currency: Currency,
    pub max_total_discount: Option<Money>,
    pub minimum_price: Option<Money>,
    pub eligibility_level: PolicyLevel,
    pub discount_strategy: CombinationStrategy,
    pub slow_threshold_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: Currency::Krw,
            max_total_discount: None,
            minimum_price: None,
            eligibility_level: PolicyLevel::Standard,
            discount_strategy: CombinationStrategy::BestSingle,
            slow_threshold_ms: DEFAULT_SLOW_OPERATION_THRESHOLD_MS,
        }
    }
}

impl Settings {
    /// Load `.env` if present, then read the environment
    pub fn from_env() -> DomainResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let currency = parse_var(&lookup, CURRENCY_VAR)?.unwrap_or(defaults.currency);
        let amount = |key: &str| -> DomainResult<Option<Money>> {
            parse_var::<Decimal, _>(&lookup, key)?
                .map(|value| Money::new(value, currency))
                .transpose()
        };

        let settings = Self {
            currency,
            max_total_discount: amount(MAX_TOTAL_DISCOUNT_VAR)?,
            minimum_price: amount(MINIMUM_PRICE_VAR)?,
            eligibility_level: parse_var(&lookup, ELIGIBILITY_LEVEL_VAR)?
                .unwrap_or(defaults.eligibility_level),
            discount_strategy: parse_var(&lookup, DISCOUNT_STRATEGY_VAR)?
                .unwrap_or(defaults.discount_strategy),
            slow_threshold_ms: parse_var(&lookup, SLOW_THRESHOLD_VAR)?
                .unwrap_or(defaults.slow_threshold_ms),
        };
        tracing::debug!(?settings, "Loaded reservation settings");
        Ok(settings)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> DomainResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            DomainError::InvalidConfiguration(format!("{}='{}': {}", key, raw, e))
        }),
    }
}
