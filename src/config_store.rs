// Rule Configuration
//
// JSON documents describing discount plans and eligibility policies. Each
// document is deserialized, checked with `validator`, then turned into the
// policy objects the engine evaluates.

use crate::discount::{
    AmountDiscountPolicy, CompositeDiscountPolicy, CouponBenefit, CouponDiscountPolicy,
    MembershipDiscountPolicy, NoDiscountPolicy, RateDiscountPolicy, SeasonalDiscountPolicy,
    SeasonalPeriod, SharedDiscountPolicy,
};
use crate::eligibility::{profile_for, EligibilityPolicy, PolicyBuilder, Rule};
use crate::error::{DomainError, DomainResult};
use crate::specification::{RestrictionMode, TimeSlotRestrictionSpecification};
use crate::types::{CombinationMode, CombinationStrategy, PolicyLevel};
use crate::validation::{
    parse_time_of_day, validate_positive_amount, validate_time_of_day, validate_unit_rate,
};
use crate::values::{Currency, DateRange, Money};
use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// A complete discount plan: strategy, guards and the leaf rules
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiscountPlanConfig {
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,
    #[serde(default)]
    pub strategy: CombinationStrategy,
    pub currency: Currency,
    #[validate(custom = "validate_positive_amount")]
    pub max_total_discount: Option<Decimal>,
    #[validate(custom = "validate_positive_amount")]
    pub minimum_price: Option<Decimal>,
    #[validate(length(min = 1, message = "At least one discount rule is required"))]
    pub rules: Vec<DiscountRuleConfig>,
}

/// One leaf of a discount plan, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountRuleConfig {
    Rate(RateRuleConfig),
    Amount(AmountRuleConfig),
    Coupon(CouponRuleConfig),
    Seasonal(SeasonalRuleConfig),
    Membership {
        #[serde(default)]
        priority: Option<i32>,
    },
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateRuleConfig {
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,
    #[validate(custom = "validate_unit_rate")]
    pub rate: Decimal,
    #[validate(custom = "validate_positive_amount")]
    pub minimum_purchase: Option<Decimal>,
    #[validate(custom = "validate_positive_amount")]
    pub max_discount: Option<Decimal>,
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AmountRuleConfig {
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,
    #[validate(custom = "validate_positive_amount")]
    pub amount: Decimal,
    #[validate(custom = "validate_positive_amount")]
    pub minimum_purchase: Option<Decimal>,
    pub priority: Option<i32>,
}

/// Coupon rule; exactly one of `rate` or `amount` must be set
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CouponRuleConfig {
    #[validate(length(min = 3, max = 32, message = "Coupon code must be 3-32 characters"))]
    pub code: String,
    #[validate(custom = "validate_unit_rate")]
    pub rate: Option<Decimal>,
    #[validate(custom = "validate_positive_amount")]
    pub amount: Option<Decimal>,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    #[serde(default)]
    pub allowed_members: Vec<Uuid>,
    #[validate(custom = "validate_positive_amount")]
    pub minimum_purchase: Option<Decimal>,
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SeasonalRuleConfig {
    #[validate(length(min = 1, message = "At least one seasonal rate is required"))]
    pub rates: Vec<SeasonalRateConfig>,
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SeasonalRateConfig {
    pub period: SeasonalPeriod,
    #[validate(custom = "validate_unit_rate")]
    pub rate: Decimal,
}

impl DiscountRuleConfig {
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            DiscountRuleConfig::Rate(config) => config.validate()?,
            DiscountRuleConfig::Amount(config) => config.validate()?,
            DiscountRuleConfig::Coupon(config) => {
                config.validate()?;
                if config.rate.is_some() == config.amount.is_some() {
                    return Err(DomainError::InvalidConfiguration(format!(
                        "Coupon '{}' needs exactly one of rate or amount",
                        config.code
                    )));
                }
            }
            DiscountRuleConfig::Seasonal(config) => {
                config.validate()?;
                for entry in &config.rates {
                    entry.validate()?;
                }
            }
            DiscountRuleConfig::Membership { .. } | DiscountRuleConfig::None => {}
        }
        Ok(())
    }

    /// Build the leaf policy, amounts expressed in `currency`
    pub fn build(&self, currency: Currency) -> DomainResult<SharedDiscountPolicy> {
        let money = |amount: Decimal| Money::new(amount, currency);
        let policy: SharedDiscountPolicy = match self {
            DiscountRuleConfig::Rate(config) => {
                let mut policy = RateDiscountPolicy::new(&config.description, config.rate)?;
                if let Some(minimum) = config.minimum_purchase {
                    policy = policy.with_minimum_purchase(money(minimum)?);
                }
                if let Some(cap) = config.max_discount {
                    policy = policy.with_max_discount(money(cap)?);
                }
                if let Some(priority) = config.priority {
                    policy = policy.with_priority(priority);
                }
                Arc::new(policy)
            }
            DiscountRuleConfig::Amount(config) => {
                let mut policy =
                    AmountDiscountPolicy::new(&config.description, money(config.amount)?)?;
                if let Some(minimum) = config.minimum_purchase {
                    policy = policy.with_minimum_purchase(money(minimum)?);
                }
                if let Some(priority) = config.priority {
                    policy = policy.with_priority(priority);
                }
                Arc::new(policy)
            }
            DiscountRuleConfig::Coupon(config) => {
                let benefit = match (config.rate, config.amount) {
                    (Some(rate), None) => CouponBenefit::Rate(rate),
                    (None, Some(amount)) => CouponBenefit::Amount(money(amount)?),
                    _ => {
                        return Err(DomainError::InvalidConfiguration(format!(
                            "Coupon '{}' needs exactly one of rate or amount",
                            config.code
                        )))
                    }
                };
                let validity = DateRange::new(config.valid_from, config.valid_until)?;
                let mut policy = CouponDiscountPolicy::new(&config.code, benefit, validity)?
                    .with_allowed_members(config.allowed_members.iter().copied());
                if let Some(minimum) = config.minimum_purchase {
                    policy = policy.with_minimum_purchase(money(minimum)?);
                }
                if let Some(priority) = config.priority {
                    policy = policy.with_priority(priority);
                }
                Arc::new(policy)
            }
            DiscountRuleConfig::Seasonal(config) => {
                let mut policy = SeasonalDiscountPolicy::new(
                    config.rates.iter().map(|entry| (entry.period, entry.rate)),
                )?;
                if let Some(priority) = config.priority {
                    policy = policy.with_priority(priority);
                }
                Arc::new(policy)
            }
            DiscountRuleConfig::Membership { priority } => {
                let policy = MembershipDiscountPolicy::new();
                match priority {
                    Some(priority) => Arc::new(policy.with_priority(*priority)),
                    None => Arc::new(policy),
                }
            }
            DiscountRuleConfig::None => Arc::new(NoDiscountPolicy),
        };
        Ok(policy)
    }
}

impl DiscountPlanConfig {
    /// Parse and validate a plan document
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let config: DiscountPlanConfig = serde_json::from_str(json)?;
        config.check()?;
        tracing::info!(
            "Loaded discount plan '{}' with {} rules ({})",
            config.description,
            config.rules.len(),
            config.strategy
        );
        Ok(config)
    }

    fn check(&self) -> DomainResult<()> {
        self.validate()?;
        for rule in &self.rules {
            rule.validate()?;
        }
        Ok(())
    }

    pub fn build(&self) -> DomainResult<CompositeDiscountPolicy> {
        self.check()?;
        let mut builder =
            CompositeDiscountPolicy::builder(&self.description).strategy(self.strategy);
        for rule in &self.rules {
            builder = builder.shared(rule.build(self.currency)?);
        }
        if let Some(cap) = self.max_total_discount {
            builder = builder.max_total_discount(Money::new(cap, self.currency)?);
        }
        if let Some(floor) = self.minimum_price {
            builder = builder.minimum_price(Money::new(floor, self.currency)?);
        }
        builder.build()
    }
}

/// Eligibility policy document
///
/// Without explicit `rules` the level's preset rule list is used. Explicit
/// rules are parameterized by the level's profile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EligibilityConfig {
    #[validate(length(min = 1, message = "Policy name cannot be empty"))]
    pub name: String,
    #[serde(default)]
    pub level: PolicyLevel,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub mode: CombinationMode,
    pub time_window: Option<TimeWindowConfig>,
}

/// Start-time restriction added on top of the rule list
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TimeWindowConfig {
    #[validate(custom = "validate_time_of_day")]
    pub start: String,
    #[validate(custom = "validate_time_of_day")]
    pub end: String,
    #[serde(default)]
    pub days: Vec<Weekday>,
    /// Refuse requests inside the window instead of only accepting them
    #[serde(default)]
    pub deny: bool,
}

impl TimeWindowConfig {
    pub fn build(&self) -> DomainResult<TimeSlotRestrictionSpecification> {
        self.validate()?;
        let mode = if self.deny {
            RestrictionMode::Deny
        } else {
            RestrictionMode::Allow
        };
        TimeSlotRestrictionSpecification::new(
            mode,
            self.days.iter().copied(),
            Some((parse_time_of_day(&self.start)?, parse_time_of_day(&self.end)?)),
        )
    }
}

impl EligibilityConfig {
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let config: EligibilityConfig = serde_json::from_str(json)?;
        config.check()?;
        tracing::info!(
            "Loaded eligibility policy '{}' (level {}, {} explicit rules)",
            config.name,
            config.level,
            config.rules.len()
        );
        Ok(config)
    }

    fn check(&self) -> DomainResult<()> {
        self.validate()?;
        if let Some(window) = &self.time_window {
            window.validate()?;
        }
        Ok(())
    }

    pub fn build(&self) -> DomainResult<EligibilityPolicy> {
        self.check()?;
        if self.level == PolicyLevel::Custom && self.rules.is_empty() {
            return Err(DomainError::InvalidConfiguration(format!(
                "Policy '{}' uses the custom level but lists no rules",
                self.name
            )));
        }

        let mut builder = if self.rules.is_empty() {
            PolicyBuilder::from_level(&self.name, self.level)
        } else {
            PolicyBuilder::new(&self.name)
                .profile(profile_for(self.level))
                .rules(self.rules.iter().copied())
        };
        builder = builder.mode(self.mode);
        if let Some(window) = &self.time_window {
            builder = builder.specification(window.build()?);
        }
        builder.build()
    }
}
