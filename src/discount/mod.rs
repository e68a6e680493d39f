// Discount Engine
//
// Price-transformation policies over an immutable purchase snapshot.
// Primitive policies each lower a price once; `CompositeDiscountPolicy`
// combines them with a strategy, then applies the global cap and floor.

pub mod composite;
pub mod coupon;
pub mod policies;
pub mod seasonal;

pub use composite::{
    AppliedDiscount, CompositeDiscountPolicy, CompositeDiscountPolicyBuilder, DiscountBreakdown,
};
pub use coupon::{CouponBenefit, CouponDiscountPolicy};
pub use policies::{
    AmountDiscountPolicy, MembershipDiscountPolicy, NoDiscountPolicy, RateDiscountPolicy,
};
pub use seasonal::{SeasonalDiscountPolicy, SeasonalPeriod};

use crate::error::{DomainError, DomainResult};
use crate::models::{Member, MembershipPlan};
use crate::values::Money;
use chrono::NaiveDate;
use std::sync::Arc;

/// Facts a discount policy may read
#[derive(Debug, Clone)]
pub struct DiscountContext {
    member: Member,
    plan: MembershipPlan,
    purchase_date: NaiveDate,
    coupon_code: Option<String>,
}

impl DiscountContext {
    pub fn new(member: Member, plan: MembershipPlan, purchase_date: NaiveDate) -> DomainResult<Self> {
        if member.plan_id != plan.id {
            return Err(DomainError::Validation(format!(
                "member {} is not enrolled in plan {}",
                member.id, plan.id
            )));
        }
        Ok(Self {
            member,
            plan,
            purchase_date,
            coupon_code: None,
        })
    }

    /// Attach the coupon code the member presented
    pub fn with_coupon(mut self, code: &str) -> Self {
        let code = code.trim();
        self.coupon_code = (!code.is_empty()).then(|| code.to_string());
        self
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn plan(&self) -> &MembershipPlan {
        &self.plan
    }

    pub fn purchase_date(&self) -> NaiveDate {
        self.purchase_date
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }
}

/// How a policy computes its discount, used by the smart strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    /// Percentage off
    Rate,
    /// Flat amount off
    Amount,
    Other,
}

/// A price transformation
///
/// Implementations never raise the price and never go below zero. When
/// `is_applicable` is false, `apply_discount` returns the price unchanged.
pub trait DiscountPolicy: Send + Sync {
    fn apply_discount(&self, price: &Money, context: &DiscountContext) -> DomainResult<Money>;

    fn is_applicable(&self, context: &DiscountContext) -> bool;

    /// Lower runs first under the priority-first strategy
    fn priority(&self) -> i32;

    fn description(&self) -> String;

    fn kind(&self) -> DiscountKind {
        DiscountKind::Other
    }
}

/// Shared, type-erased discount policy
pub type SharedDiscountPolicy = Arc<dyn DiscountPolicy>;

impl<P> DiscountPolicy for Arc<P>
where
    P: DiscountPolicy + ?Sized,
{
    fn apply_discount(&self, price: &Money, context: &DiscountContext) -> DomainResult<Money> {
        (**self).apply_discount(price, context)
    }

    fn is_applicable(&self, context: &DiscountContext) -> bool {
        (**self).is_applicable(context)
    }

    fn priority(&self) -> i32 {
        (**self).priority()
    }

    fn description(&self) -> String {
        (**self).description()
    }

    fn kind(&self) -> DiscountKind {
        (**self).kind()
    }
}

/// True when `price` meets an optional minimum purchase in the same currency
pub(crate) fn meets_minimum(price: &Money, minimum: Option<&Money>) -> DomainResult<bool> {
    match minimum {
        Some(minimum) => {
            price.ensure_same_currency(minimum)?;
            Ok(price.amount() >= minimum.amount())
        }
        None => Ok(true),
    }
}
