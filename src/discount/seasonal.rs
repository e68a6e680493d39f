// Seasonal discount policy

use super::{DiscountContext, DiscountKind, DiscountPolicy};
use crate::error::{DomainError, DomainResult};
use crate::validation::require_unit_rate;
use crate::values::Money;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_SEASONAL_PRIORITY: i32 = 30;

/// Named calendar windows; declaration order is matching priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalPeriod {
    /// Dec 20 to Jan 5
    HolidaySeason,
    /// Aug 20 to Sep 10
    BackToSchool,
    /// Jul 15 to Aug 19
    SummerVacation,
    /// November
    OffSeason,
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl SeasonalPeriod {
    pub const ALL: [SeasonalPeriod; 8] = [
        SeasonalPeriod::HolidaySeason,
        SeasonalPeriod::BackToSchool,
        SeasonalPeriod::SummerVacation,
        SeasonalPeriod::OffSeason,
        SeasonalPeriod::Spring,
        SeasonalPeriod::Summer,
        SeasonalPeriod::Autumn,
        SeasonalPeriod::Winter,
    ];

    pub fn contains(&self, date: NaiveDate) -> bool {
        let md = (date.month(), date.day());
        match self {
            SeasonalPeriod::HolidaySeason => md >= (12, 20) || md <= (1, 5),
            SeasonalPeriod::BackToSchool => (8, 20) <= md && md <= (9, 10),
            SeasonalPeriod::SummerVacation => (7, 15) <= md && md <= (8, 19),
            SeasonalPeriod::OffSeason => date.month() == 11,
            SeasonalPeriod::Spring => (3..=5).contains(&date.month()),
            SeasonalPeriod::Summer => (6..=8).contains(&date.month()),
            SeasonalPeriod::Autumn => (9..=11).contains(&date.month()),
            SeasonalPeriod::Winter => matches!(date.month(), 12 | 1 | 2),
        }
    }

    /// Highest-priority period containing `date`
    ///
    /// The four seasons cover the whole year, so there is always one.
    pub fn for_date(date: NaiveDate) -> SeasonalPeriod {
        Self::matching(date)
            .next()
            .unwrap_or(SeasonalPeriod::Winter)
    }

    /// Every period containing `date`, highest priority first
    pub fn matching(date: NaiveDate) -> impl Iterator<Item = SeasonalPeriod> {
        Self::ALL.into_iter().filter(move |period| period.contains(date))
    }
}

impl fmt::Display for SeasonalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonalPeriod::HolidaySeason => write!(f, "holiday_season"),
            SeasonalPeriod::BackToSchool => write!(f, "back_to_school"),
            SeasonalPeriod::SummerVacation => write!(f, "summer_vacation"),
            SeasonalPeriod::OffSeason => write!(f, "off_season"),
            SeasonalPeriod::Spring => write!(f, "spring"),
            SeasonalPeriod::Summer => write!(f, "summer"),
            SeasonalPeriod::Autumn => write!(f, "autumn"),
            SeasonalPeriod::Winter => write!(f, "winter"),
        }
    }
}

/// Rate per seasonal period, picked by the purchase date
#[derive(Debug, Clone)]
pub struct SeasonalDiscountPolicy {
    rates: BTreeMap<SeasonalPeriod, Decimal>,
    priority: i32,
}

impl SeasonalDiscountPolicy {
    pub fn new(rates: impl IntoIterator<Item = (SeasonalPeriod, Decimal)>) -> DomainResult<Self> {
        let mut table = BTreeMap::new();
        for (period, rate) in rates {
            table.insert(period, require_unit_rate(rate)?);
        }
        if table.is_empty() {
            return Err(DomainError::EmptyPolicyList("seasonal rates"));
        }
        Ok(Self {
            rates: table,
            priority: DEFAULT_SEASONAL_PRIORITY,
        })
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// First period containing `date` that has a configured rate
    pub fn rate_for(&self, date: NaiveDate) -> Option<(SeasonalPeriod, Decimal)> {
        SeasonalPeriod::matching(date)
            .find_map(|period| self.rates.get(&period).map(|rate| (period, *rate)))
    }
}

impl DiscountPolicy for SeasonalDiscountPolicy {
    fn apply_discount(&self, price: &Money, context: &DiscountContext) -> DomainResult<Money> {
        match self.rate_for(context.purchase_date()) {
            Some((_, rate)) if !rate.is_zero() => {
                let discount = price.multiply(rate)?;
                price.saturating_sub(&discount)
            }
            _ => Ok(*price),
        }
    }

    fn is_applicable(&self, context: &DiscountContext) -> bool {
        self.rate_for(context.purchase_date())
            .map_or(false, |(_, rate)| !rate.is_zero())
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> String {
        let periods: Vec<String> = self.rates.keys().map(|p| p.to_string()).collect();
        format!("Seasonal discount ({})", periods.join(", "))
    }

    fn kind(&self) -> DiscountKind {
        DiscountKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::fixtures::{context, date, krw};
    use rust_decimal_macros::dec;

    #[test]
    fn test_period_for_date() {
        assert_eq!(SeasonalPeriod::for_date(date(12, 25)), SeasonalPeriod::HolidaySeason);
        assert_eq!(SeasonalPeriod::for_date(date(1, 5)), SeasonalPeriod::HolidaySeason);
        assert_eq!(SeasonalPeriod::for_date(date(1, 6)), SeasonalPeriod::Winter);
        assert_eq!(SeasonalPeriod::for_date(date(8, 19)), SeasonalPeriod::SummerVacation);
        assert_eq!(SeasonalPeriod::for_date(date(8, 20)), SeasonalPeriod::BackToSchool);
        assert_eq!(SeasonalPeriod::for_date(date(9, 10)), SeasonalPeriod::BackToSchool);
        assert_eq!(SeasonalPeriod::for_date(date(9, 11)), SeasonalPeriod::Autumn);
        assert_eq!(SeasonalPeriod::for_date(date(11, 15)), SeasonalPeriod::OffSeason);
        assert_eq!(SeasonalPeriod::for_date(date(4, 15)), SeasonalPeriod::Spring);
        assert_eq!(SeasonalPeriod::for_date(date(6, 1)), SeasonalPeriod::Summer);
    }

    #[test]
    fn test_matching_lists_overlapping_periods() {
        let periods: Vec<_> = SeasonalPeriod::matching(date(7, 20)).collect();
        assert_eq!(periods, vec![SeasonalPeriod::SummerVacation, SeasonalPeriod::Summer]);
    }

    #[test]
    fn test_falls_through_to_configured_period() {
        // Only the broad season is configured; a vacation date still gets it
        let policy = SeasonalDiscountPolicy::new([(SeasonalPeriod::Summer, dec!(0.05))]).unwrap();
        assert_eq!(
            policy.rate_for(date(7, 20)),
            Some((SeasonalPeriod::Summer, dec!(0.05)))
        );

        let both = SeasonalDiscountPolicy::new([
            (SeasonalPeriod::Summer, dec!(0.05)),
            (SeasonalPeriod::SummerVacation, dec!(0.15)),
        ])
        .unwrap();
        assert_eq!(
            both.rate_for(date(7, 20)),
            Some((SeasonalPeriod::SummerVacation, dec!(0.15)))
        );
    }

    #[test]
    fn test_applies_spring_rate() {
        // Fixture purchase date is April 15
        let policy = SeasonalDiscountPolicy::new([(SeasonalPeriod::Spring, dec!(0.2))]).unwrap();
        assert!(policy.is_applicable(&context()));
        assert_eq!(policy.apply_discount(&krw(10000), &context()).unwrap(), krw(8000));
    }

    #[test]
    fn test_identity_out_of_season() {
        let policy = SeasonalDiscountPolicy::new([(SeasonalPeriod::HolidaySeason, dec!(0.3))]).unwrap();
        assert!(!policy.is_applicable(&context()));
        assert_eq!(policy.apply_discount(&krw(10000), &context()).unwrap(), krw(10000));
    }

    #[test]
    fn test_construction_validation() {
        assert!(SeasonalDiscountPolicy::new([]).is_err());
        assert!(SeasonalDiscountPolicy::new([(SeasonalPeriod::Winter, dec!(1.1))]).is_err());
    }
}
