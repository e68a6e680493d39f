// Primitive discount policies: rate, flat amount, plan membership and none

use super::{meets_minimum, DiscountContext, DiscountKind, DiscountPolicy};
use crate::error::{DomainError, DomainResult};
use crate::validation::{require_non_blank, require_unit_rate};
use crate::values::Money;
use rust_decimal::Decimal;

pub const DEFAULT_MEMBERSHIP_PRIORITY: i32 = 20;
pub const DEFAULT_RATE_PRIORITY: i32 = 40;
pub const DEFAULT_AMOUNT_PRIORITY: i32 = 40;

/// Percentage off, optionally gated by a minimum purchase and capped
#[derive(Debug, Clone)]
pub struct RateDiscountPolicy {
    description: String,
    rate: Decimal,
    minimum_purchase: Option<Money>,
    max_discount: Option<Money>,
    priority: i32,
}

impl RateDiscountPolicy {
    pub fn new(description: &str, rate: Decimal) -> DomainResult<Self> {
        Ok(Self {
            description: require_non_blank("discount description", description)?,
            rate: require_unit_rate(rate)?,
            minimum_purchase: None,
            max_discount: None,
            priority: DEFAULT_RATE_PRIORITY,
        })
    }

    pub fn with_minimum_purchase(mut self, minimum: Money) -> Self {
        self.minimum_purchase = Some(minimum);
        self
    }

    pub fn with_max_discount(mut self, cap: Money) -> Self {
        self.max_discount = Some(cap);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }
}

impl DiscountPolicy for RateDiscountPolicy {
    fn apply_discount(&self, price: &Money, _context: &DiscountContext) -> DomainResult<Money> {
        if !meets_minimum(price, self.minimum_purchase.as_ref())? {
            return Ok(*price);
        }
        let mut discount = price.multiply(self.rate)?;
        if let Some(cap) = &self.max_discount {
            discount = discount.min(cap)?;
        }
        price.saturating_sub(&discount)
    }

    fn is_applicable(&self, _context: &DiscountContext) -> bool {
        !self.rate.is_zero()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn kind(&self) -> DiscountKind {
        DiscountKind::Rate
    }
}

/// Flat amount off, clamped at zero
#[derive(Debug, Clone)]
pub struct AmountDiscountPolicy {
    description: String,
    amount: Money,
    minimum_purchase: Option<Money>,
    priority: i32,
}

impl AmountDiscountPolicy {
    pub fn new(description: &str, amount: Money) -> DomainResult<Self> {
        if amount.is_zero() {
            return Err(DomainError::InvalidAmount(
                "discount amount must be positive".to_string(),
            ));
        }
        Ok(Self {
            description: require_non_blank("discount description", description)?,
            amount,
            minimum_purchase: None,
            priority: DEFAULT_AMOUNT_PRIORITY,
        })
    }

    pub fn with_minimum_purchase(mut self, minimum: Money) -> Self {
        self.minimum_purchase = Some(minimum);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl DiscountPolicy for AmountDiscountPolicy {
    fn apply_discount(&self, price: &Money, _context: &DiscountContext) -> DomainResult<Money> {
        if !meets_minimum(price, self.minimum_purchase.as_ref())? {
            return Ok(*price);
        }
        price.saturating_sub(&self.amount)
    }

    fn is_applicable(&self, _context: &DiscountContext) -> bool {
        true
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn kind(&self) -> DiscountKind {
        DiscountKind::Amount
    }
}

/// The member's plan discount rate
#[derive(Debug, Clone)]
pub struct MembershipDiscountPolicy {
    priority: i32,
}

impl Default for MembershipDiscountPolicy {
    fn default() -> Self {
        Self {
            priority: DEFAULT_MEMBERSHIP_PRIORITY,
        }
    }
}

impl MembershipDiscountPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl DiscountPolicy for MembershipDiscountPolicy {
    fn apply_discount(&self, price: &Money, context: &DiscountContext) -> DomainResult<Money> {
        if !self.is_applicable(context) {
            return Ok(*price);
        }
        let discount = price.multiply(context.plan().discount_rate)?;
        price.saturating_sub(&discount)
    }

    fn is_applicable(&self, context: &DiscountContext) -> bool {
        let plan = context.plan();
        context.member().is_active() && plan.active && !plan.discount_rate.is_zero()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> String {
        "Membership plan discount".to_string()
    }
}

/// Identity; always applicable and always last in priority
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiscountPolicy;

impl DiscountPolicy for NoDiscountPolicy {
    fn apply_discount(&self, price: &Money, _context: &DiscountContext) -> DomainResult<Money> {
        Ok(*price)
    }

    fn is_applicable(&self, _context: &DiscountContext) -> bool {
        true
    }

    fn priority(&self) -> i32 {
        i32::MAX
    }

    fn description(&self) -> String {
        "No discount".to_string()
    }
}
