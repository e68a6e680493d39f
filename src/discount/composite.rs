// Composite discount policy
//
// Combines child policies with one of four strategies, then enforces the
// global cap on total discount and the minimum price floor, in that order.

use super::{DiscountContext, DiscountKind, DiscountPolicy, SharedDiscountPolicy};
use crate::error::{DomainError, DomainResult};
use crate::types::CombinationStrategy;
use crate::validation::require_non_blank;
use crate::values::Money;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// One policy's contribution to a price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedDiscount {
    pub description: String,
    pub amount: Money,
}

/// Full pricing result with per-policy breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountBreakdown {
    pub original: Money,
    pub final_price: Money,
    pub total_discount: Money,
    pub strategy: CombinationStrategy,
    pub applied: Vec<AppliedDiscount>,
    /// Total discount was cut to `max_total_discount`
    pub capped: bool,
    /// Price was raised to `minimum_price`
    pub floored: bool,
}

/// Strategy-driven combination of discount policies
#[derive(Clone)]
pub struct CompositeDiscountPolicy {
    description: String,
    policies: Vec<SharedDiscountPolicy>,
    strategy: CombinationStrategy,
    max_total_discount: Option<Money>,
    minimum_price: Option<Money>,
    priority: Option<i32>,
}

/// Builder for [`CompositeDiscountPolicy`]
pub struct CompositeDiscountPolicyBuilder {
    description: String,
    policies: Vec<SharedDiscountPolicy>,
    strategy: CombinationStrategy,
    max_total_discount: Option<Money>,
    minimum_price: Option<Money>,
    priority: Option<i32>,
}

impl CompositeDiscountPolicyBuilder {
    pub fn policy<P>(mut self, policy: P) -> Self
    where
        P: DiscountPolicy + 'static,
    {
        self.policies.push(Arc::new(policy));
        self
    }

    pub fn shared(mut self, policy: SharedDiscountPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn strategy(mut self, strategy: CombinationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn max_total_discount(mut self, cap: Money) -> Self {
        self.max_total_discount = Some(cap);
        self
    }

    pub fn minimum_price(mut self, floor: Money) -> Self {
        self.minimum_price = Some(floor);
        self
    }

    /// Override the priority reported when nested in another composite
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn build(self) -> DomainResult<CompositeDiscountPolicy> {
        let description = require_non_blank("composite description", &self.description)?;
        if self.policies.is_empty() {
            return Err(DomainError::EmptyPolicyList("discount policies"));
        }
        if let (Some(cap), Some(floor)) = (&self.max_total_discount, &self.minimum_price) {
            cap.ensure_same_currency(floor)?;
        }
        Ok(CompositeDiscountPolicy {
            description,
            policies: self.policies,
            strategy: self.strategy,
            max_total_discount: self.max_total_discount,
            minimum_price: self.minimum_price,
            priority: self.priority,
        })
    }
}

/// Running result of a strategy before global constraints
struct Outcome {
    price: Money,
    applied: Vec<AppliedDiscount>,
}

impl CompositeDiscountPolicy {
    pub fn builder(description: &str) -> CompositeDiscountPolicyBuilder {
        CompositeDiscountPolicyBuilder {
            description: description.to_string(),
            policies: Vec::new(),
            strategy: CombinationStrategy::default(),
            max_total_discount: None,
            minimum_price: None,
            priority: None,
        }
    }

    pub fn strategy(&self) -> CombinationStrategy {
        self.strategy
    }

    pub fn policies(&self) -> &[SharedDiscountPolicy] {
        &self.policies
    }

    /// Price `price` and explain how the result came about
    pub fn evaluate(&self, price: &Money, context: &DiscountContext) -> DomainResult<DiscountBreakdown> {
        let applicable: Vec<&SharedDiscountPolicy> = self
            .policies
            .iter()
            .filter(|policy| policy.is_applicable(context))
            .collect();

        let outcome = match self.strategy {
            CombinationStrategy::Sequential => Self::sequential(price, &applicable, context)?,
            CombinationStrategy::BestSingle => Self::best_single(price, &applicable, context)?,
            CombinationStrategy::PriorityFirst => Self::priority_first(price, &applicable, context)?,
            CombinationStrategy::Smart => Self::smart(price, &applicable, context)?,
        };

        let mut final_price = outcome.price;
        let mut capped = false;
        let mut floored = false;

        if let Some(cap) = &self.max_total_discount {
            let discount = price.saturating_sub(&final_price)?;
            price.ensure_same_currency(cap)?;
            if discount.amount() > cap.amount() {
                final_price = price.saturating_sub(cap)?;
                capped = true;
            }
        }

        if let Some(minimum) = &self.minimum_price {
            let floor = minimum.min(price)?;
            if final_price.amount() < floor.amount() {
                final_price = floor;
                floored = true;
            }
        }

        Ok(DiscountBreakdown {
            original: *price,
            final_price,
            total_discount: price.saturating_sub(&final_price)?,
            strategy: self.strategy,
            applied: outcome.applied,
            capped,
            floored,
        })
    }

    /// Apply one policy, never letting it raise the price
    fn step(
        policy: &SharedDiscountPolicy,
        price: &Money,
        context: &DiscountContext,
    ) -> DomainResult<(Money, Money)> {
        let result = policy.apply_discount(price, context)?.min(price)?;
        let discount = price.saturating_sub(&result)?;
        Ok((result, discount))
    }

    fn applied(policy: &SharedDiscountPolicy, amount: Money) -> AppliedDiscount {
        AppliedDiscount {
            description: policy.description(),
            amount,
        }
    }

    fn sequential(
        price: &Money,
        policies: &[&SharedDiscountPolicy],
        context: &DiscountContext,
    ) -> DomainResult<Outcome> {
        let mut current = *price;
        let mut applied = Vec::new();
        for policy in policies {
            let (next, discount) = Self::step(policy, &current, context)?;
            if !discount.is_zero() {
                applied.push(Self::applied(policy, discount));
            }
            current = next;
        }
        Ok(Outcome {
            price: current,
            applied,
        })
    }

    /// Largest single discount on `price`; the first listed wins ties
    fn best_of<'a>(
        price: &Money,
        policies: impl IntoIterator<Item = &'a SharedDiscountPolicy>,
        context: &DiscountContext,
    ) -> DomainResult<Option<(&'a SharedDiscountPolicy, Money, Money)>> {
        let mut best: Option<(&SharedDiscountPolicy, Money, Money)> = None;
        for policy in policies {
            let (result, discount) = Self::step(policy, price, context)?;
            let better = match &best {
                Some((_, _, best_discount)) => discount.amount() > best_discount.amount(),
                None => !discount.is_zero(),
            };
            if better {
                best = Some((policy, result, discount));
            }
        }
        Ok(best)
    }

    fn best_single(
        price: &Money,
        policies: &[&SharedDiscountPolicy],
        context: &DiscountContext,
    ) -> DomainResult<Outcome> {
        Ok(match Self::best_of(price, policies.iter().copied(), context)? {
            Some((policy, result, discount)) => Outcome {
                price: result,
                applied: vec![Self::applied(policy, discount)],
            },
            None => Outcome {
                price: *price,
                applied: Vec::new(),
            },
        })
    }

    fn priority_first(
        price: &Money,
        policies: &[&SharedDiscountPolicy],
        context: &DiscountContext,
    ) -> DomainResult<Outcome> {
        // min_by_key keeps the first of equal keys
        let chosen = policies.iter().min_by_key(|policy| policy.priority());
        match chosen {
            Some(policy) => Self::sequential(price, &[*policy], context),
            None => Ok(Outcome {
                price: *price,
                applied: Vec::new(),
            }),
        }
    }

    fn smart(
        price: &Money,
        policies: &[&SharedDiscountPolicy],
        context: &DiscountContext,
    ) -> DomainResult<Outcome> {
        let others: Vec<&SharedDiscountPolicy> = policies
            .iter()
            .copied()
            .filter(|policy| policy.kind() == DiscountKind::Other)
            .collect();
        let mut outcome = Self::sequential(price, &others, context)?;
        let intermediate = outcome.price;

        let best_rate = Self::best_of(
            &intermediate,
            policies.iter().copied().filter(|p| p.kind() == DiscountKind::Rate),
            context,
        )?;
        let best_amount = Self::best_of(
            &intermediate,
            policies.iter().copied().filter(|p| p.kind() == DiscountKind::Amount),
            context,
        )?;

        let winner = match (best_rate, best_amount) {
            (Some(rate), Some(amount)) => {
                if rate.2.amount() >= amount.2.amount() {
                    Some(rate)
                } else {
                    Some(amount)
                }
            }
            (rate, amount) => rate.or(amount),
        };

        if let Some((policy, result, discount)) = winner {
            outcome.price = result;
            outcome.applied.push(Self::applied(policy, discount));
        }
        Ok(outcome)
    }
}

impl fmt::Debug for CompositeDiscountPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeDiscountPolicy")
            .field("description", &self.description)
            .field("strategy", &self.strategy)
            .field("policies", &self.policies.len())
            .field("max_total_discount", &self.max_total_discount)
            .field("minimum_price", &self.minimum_price)
            .finish()
    }
}

impl DiscountPolicy for CompositeDiscountPolicy {
    fn apply_discount(&self, price: &Money, context: &DiscountContext) -> DomainResult<Money> {
        Ok(self.evaluate(price, context)?.final_price)
    }

    fn is_applicable(&self, context: &DiscountContext) -> bool {
        self.policies.iter().any(|policy| policy.is_applicable(context))
    }

    /// Explicit override, else the most urgent child
    fn priority(&self) -> i32 {
        self.priority.unwrap_or_else(|| {
            self.policies
                .iter()
                .map(|policy| policy.priority())
                .min()
                .unwrap_or(i32::MAX)
        })
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::fixtures::{context, krw};
    use crate::discount::{
        AmountDiscountPolicy, CouponBenefit, CouponDiscountPolicy, MembershipDiscountPolicy,
        NoDiscountPolicy, RateDiscountPolicy,
    };
    use crate::values::{Currency, DateRange};
    use rust_decimal_macros::dec;

    fn flat(units: u64) -> AmountDiscountPolicy {
        AmountDiscountPolicy::new(&format!("{} off", units), krw(units)).unwrap()
    }

    fn rate(percent: u32) -> RateDiscountPolicy {
        RateDiscountPolicy::new(
            &format!("{}% off", percent),
            rust_decimal::Decimal::new(i64::from(percent), 2),
        )
        .unwrap()
    }

    #[test]
    fn test_best_single_picks_largest() {
        let policy = CompositeDiscountPolicy::builder("best")
            .strategy(CombinationStrategy::BestSingle)
            .policy(flat(1000))
            .policy(flat(1500))
            .policy(flat(800))
            .build()
            .unwrap();

        let breakdown = policy.evaluate(&krw(10000), &context()).unwrap();
        assert_eq!(breakdown.final_price, krw(8500));
        assert_eq!(breakdown.total_discount, krw(1500));
        assert_eq!(breakdown.applied.len(), 1);
        assert_eq!(breakdown.applied[0].description, "1500 off");
    }

    #[test]
    fn test_best_single_tie_keeps_first() {
        let policy = CompositeDiscountPolicy::builder("tie")
            .strategy(CombinationStrategy::BestSingle)
            .policy(rate(10))
            .policy(flat(1000))
            .build()
            .unwrap();
        let breakdown = policy.evaluate(&krw(10000), &context()).unwrap();
        assert_eq!(breakdown.applied[0].description, "10% off");
    }

    #[test]
    fn test_sequential_chains() {
        let policy = CompositeDiscountPolicy::builder("stack")
            .strategy(CombinationStrategy::Sequential)
            .policy(rate(10))
            .policy(flat(1000))
            .build()
            .unwrap();

        let breakdown = policy.evaluate(&krw(10000), &context()).unwrap();
        assert_eq!(breakdown.final_price, krw(8000));
        assert_eq!(
            breakdown.applied,
            vec![
                AppliedDiscount {
                    description: "10% off".to_string(),
                    amount: krw(1000)
                },
                AppliedDiscount {
                    description: "1000 off".to_string(),
                    amount: krw(1000)
                },
            ]
        );
    }

    #[test]
    fn test_sequential_order_matters() {
        let flat_first = CompositeDiscountPolicy::builder("flat first")
            .strategy(CombinationStrategy::Sequential)
            .policy(flat(1000))
            .policy(rate(10))
            .build()
            .unwrap();
        assert_eq!(flat_first.apply_discount(&krw(10000), &context()).unwrap(), krw(8100));
    }

    #[test]
    fn test_priority_first() {
        let policy = CompositeDiscountPolicy::builder("priority")
            .strategy(CombinationStrategy::PriorityFirst)
            .policy(flat(3000).with_priority(50))
            .policy(rate(10).with_priority(5))
            .policy(flat(500).with_priority(5))
            .build()
            .unwrap();

        let breakdown = policy.evaluate(&krw(10000), &context()).unwrap();
        assert_eq!(breakdown.final_price, krw(9000));
        assert_eq!(breakdown.applied[0].description, "10% off");
    }

    #[test]
    fn test_priority_first_skips_inapplicable() {
        let coupon = CouponDiscountPolicy::new(
            "VIP50",
            CouponBenefit::Rate(dec!(0.5)),
            DateRange::new(
                chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                chrono::NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            )
            .unwrap(),
        )
        .unwrap()
        .with_priority(1);
        let policy = CompositeDiscountPolicy::builder("priority")
            .strategy(CombinationStrategy::PriorityFirst)
            .policy(coupon)
            .policy(flat(1000))
            .build()
            .unwrap();

        // No coupon presented
        assert_eq!(policy.apply_discount(&krw(10000), &context()).unwrap(), krw(9000));
        // Coupon presented
        let with_coupon = context().with_coupon("vip50");
        assert_eq!(policy.apply_discount(&krw(10000), &with_coupon).unwrap(), krw(5000));
    }

    #[test]
    fn test_smart_applies_others_then_best_of_rate_or_amount() {
        // Membership (10%, other) first: 10000 -> 9000
        // then 20% of 9000 = 1800 beats 1500 flat
        let policy = CompositeDiscountPolicy::builder("smart")
            .strategy(CombinationStrategy::Smart)
            .policy(flat(1500))
            .policy(rate(20))
            .policy(MembershipDiscountPolicy::new())
            .build()
            .unwrap();

        let breakdown = policy.evaluate(&krw(10000), &context()).unwrap();
        assert_eq!(breakdown.final_price, krw(7200));
        assert_eq!(breakdown.applied.len(), 2);
        assert_eq!(breakdown.applied[0].description, "Membership plan discount");
        assert_eq!(breakdown.applied[1].description, "20% off");
    }

    #[test]
    fn test_smart_rate_wins_ties() {
        let policy = CompositeDiscountPolicy::builder("smart tie")
            .strategy(CombinationStrategy::Smart)
            .policy(flat(1000))
            .policy(rate(10))
            .build()
            .unwrap();
        let breakdown = policy.evaluate(&krw(10000), &context()).unwrap();
        assert_eq!(breakdown.final_price, krw(9000));
        assert_eq!(breakdown.applied[0].description, "10% off");
    }

    #[test]
    fn test_cap_then_floor() {
        let capped = CompositeDiscountPolicy::builder("capped")
            .strategy(CombinationStrategy::Sequential)
            .policy(rate(50))
            .max_total_discount(krw(3000))
            .build()
            .unwrap();
        let breakdown = capped.evaluate(&krw(10000), &context()).unwrap();
        assert_eq!(breakdown.final_price, krw(7000));
        assert!(breakdown.capped);
        assert!(!breakdown.floored);

        let floored = CompositeDiscountPolicy::builder("floored")
            .policy(rate(50))
            .minimum_price(krw(8000))
            .build()
            .unwrap();
        let breakdown = floored.evaluate(&krw(10000), &context()).unwrap();
        assert_eq!(breakdown.final_price, krw(8000));
        assert!(breakdown.floored);
    }

    #[test]
    fn test_floor_never_raises_above_original() {
        let policy = CompositeDiscountPolicy::builder("floored")
            .policy(rate(50))
            .minimum_price(krw(20000))
            .build()
            .unwrap();
        assert_eq!(policy.apply_discount(&krw(10000), &context()).unwrap(), krw(10000));
    }

    #[test]
    fn test_no_discount_composite_is_identity() {
        let policy = CompositeDiscountPolicy::builder("none")
            .policy(NoDiscountPolicy)
            .build()
            .unwrap();
        let breakdown = policy.evaluate(&krw(10000), &context()).unwrap();
        assert_eq!(breakdown.final_price, krw(10000));
        assert!(breakdown.applied.is_empty());
        assert!(breakdown.total_discount.is_zero());
    }

    #[test]
    fn test_composites_nest() {
        let inner = CompositeDiscountPolicy::builder("inner")
            .strategy(CombinationStrategy::Sequential)
            .policy(rate(10))
            .policy(flat(1000))
            .build()
            .unwrap();
        let outer = CompositeDiscountPolicy::builder("outer")
            .strategy(CombinationStrategy::BestSingle)
            .policy(inner)
            .policy(flat(1500))
            .build()
            .unwrap();
        let breakdown = outer.evaluate(&krw(10000), &context()).unwrap();
        assert_eq!(breakdown.final_price, krw(8000));
        assert_eq!(breakdown.applied[0].description, "inner");
        assert_eq!(outer.priority(), 40);
    }

    #[test]
    fn test_construction_validation() {
        assert!(matches!(
            CompositeDiscountPolicy::builder("empty").build(),
            Err(DomainError::EmptyPolicyList(_))
        ));
        assert!(CompositeDiscountPolicy::builder("  ")
            .policy(NoDiscountPolicy)
            .build()
            .is_err());
        assert!(CompositeDiscountPolicy::builder("mixed")
            .policy(NoDiscountPolicy)
            .max_total_discount(krw(1000))
            .minimum_price(Money::of(1, Currency::Usd))
            .build()
            .is_err());
    }

    #[test]
    fn test_currency_mismatch_propagates() {
        let policy = CompositeDiscountPolicy::builder("usd flat")
            .policy(AmountDiscountPolicy::new("5 off", Money::of(5, Currency::Usd)).unwrap())
            .build()
            .unwrap();
        assert!(policy.apply_discount(&krw(10000), &context()).is_err());
    }
}
