// Coupon discount policy

use super::{meets_minimum, DiscountContext, DiscountKind, DiscountPolicy};
use crate::error::{DomainError, DomainResult};
use crate::validation::require_unit_rate;
use crate::values::{DateRange, Money};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use uuid::Uuid;

pub const DEFAULT_COUPON_PRIORITY: i32 = 10;

const COUPON_CODE_PATTERN: &str = r"^[A-Z0-9][A-Z0-9_-]{2,31}$";

static COUPON_CODE_REGEX: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn coupon_code_regex() -> DomainResult<&'static Regex> {
    COUPON_CODE_REGEX
        .get_or_init(|| Regex::new(COUPON_CODE_PATTERN))
        .as_ref()
        .map_err(|e| DomainError::InvalidConfiguration(e.to_string()))
}

/// What a coupon takes off
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CouponBenefit {
    Rate(Decimal),
    Amount(Money),
}

/// Discount unlocked by presenting a code within its validity window
#[derive(Debug, Clone)]
pub struct CouponDiscountPolicy {
    code: String,
    benefit: CouponBenefit,
    validity: DateRange,
    allowed_members: HashSet<Uuid>,
    minimum_purchase: Option<Money>,
    priority: i32,
}

/// Upper-case and validate a coupon code
pub fn normalize_coupon_code(code: &str) -> DomainResult<String> {
    let pattern = coupon_code_regex()?;
    let normalized = code.trim().to_uppercase();
    if !pattern.is_match(&normalized) {
        return Err(DomainError::Validation(format!(
            "Invalid coupon code '{}': expected 3-32 letters, digits, '-' or '_'",
            code
        )));
    }
    Ok(normalized)
}

impl CouponDiscountPolicy {
    pub fn new(code: &str, benefit: CouponBenefit, validity: DateRange) -> DomainResult<Self> {
        match benefit {
            CouponBenefit::Rate(rate) => {
                require_unit_rate(rate)?;
            }
            CouponBenefit::Amount(amount) if amount.is_zero() => {
                return Err(DomainError::InvalidAmount(
                    "coupon amount must be positive".to_string(),
                ));
            }
            CouponBenefit::Amount(_) => {}
        }
        Ok(Self {
            code: normalize_coupon_code(code)?,
            benefit,
            validity,
            allowed_members: HashSet::new(),
            minimum_purchase: None,
            priority: DEFAULT_COUPON_PRIORITY,
        })
    }

    /// Restrict the coupon to these members
    pub fn with_allowed_members(mut self, members: impl IntoIterator<Item = Uuid>) -> Self {
        self.allowed_members.extend(members);
        self
    }

    pub fn with_minimum_purchase(mut self, minimum: Money) -> Self {
        self.minimum_purchase = Some(minimum);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl DiscountPolicy for CouponDiscountPolicy {
    fn apply_discount(&self, price: &Money, context: &DiscountContext) -> DomainResult<Money> {
        if !self.is_applicable(context) || !meets_minimum(price, self.minimum_purchase.as_ref())? {
            return Ok(*price);
        }
        let discount = match self.benefit {
            CouponBenefit::Rate(rate) => price.multiply(rate)?,
            CouponBenefit::Amount(amount) => amount,
        };
        price.saturating_sub(&discount)
    }

    fn is_applicable(&self, context: &DiscountContext) -> bool {
        let code_matches = context
            .coupon_code()
            .map_or(false, |presented| presented.eq_ignore_ascii_case(&self.code));
        code_matches
            && self.validity.contains(context.purchase_date())
            && (self.allowed_members.is_empty()
                || self.allowed_members.contains(&context.member().id))
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> String {
        match self.benefit {
            CouponBenefit::Rate(rate) => format!(
                "Coupon {} ({}% off)",
                self.code,
                (rate * Decimal::ONE_HUNDRED).normalize()
            ),
            CouponBenefit::Amount(amount) => format!("Coupon {} ({} off)", self.code, amount),
        }
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

    fn spring_coupon() -> CouponDiscountPolicy {
        CouponDiscountPolicy::new(
            "spring-10",
            CouponBenefit::Rate(dec!(0.1)),
            DateRange::new(date(3, 1), date(5, 31)).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_code_is_normalized() {
        assert_eq!(spring_coupon().code(), "SPRING-10");
        assert!(normalize_coupon_code("ab").is_err());
        assert!(normalize_coupon_code("-LEADING").is_err());
        assert!(normalize_coupon_code("HAS SPACE").is_err());
        assert!(normalize_coupon_code(&"X".repeat(33)).is_err());
    }

    #[test]
    fn test_code_pattern_compiled_once() {
        let first = coupon_code_regex().unwrap();
        let second = coupon_code_regex().unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(first.is_match("WELCOME_2026"));
    }

    #[test]
    fn test_applies_with_matching_code() {
        let coupon = spring_coupon();
        let with_code = context().with_coupon("Spring-10");
        assert!(coupon.is_applicable(&with_code));
        assert_eq!(coupon.apply_discount(&krw(10000), &with_code).unwrap(), krw(9000));
        assert_eq!(coupon.description(), "Coupon SPRING-10 (10% off)");
    }

    #[test]
    fn test_identity_without_code() {
        let coupon = spring_coupon();
        assert!(!coupon.is_applicable(&context()));
        assert_eq!(coupon.apply_discount(&krw(10000), &context()).unwrap(), krw(10000));
        assert!(!coupon.is_applicable(&context().with_coupon("SUMMER")));
    }

    #[test]
    fn test_outside_validity() {
        let coupon = CouponDiscountPolicy::new(
            "WINTER",
            CouponBenefit::Amount(krw(3000)),
            DateRange::new(date(1, 1), date(2, 28)).unwrap(),
        )
        .unwrap();
        assert!(!coupon.is_applicable(&context().with_coupon("WINTER")));
    }

    #[test]
    fn test_member_allowlist() {
        let ctx = context().with_coupon("SPRING-10");
        let other = spring_coupon().with_allowed_members([Uuid::new_v4()]);
        assert!(!other.is_applicable(&ctx));
        let mine = spring_coupon().with_allowed_members([ctx.member().id]);
        assert!(mine.is_applicable(&ctx));
    }

    #[test]
    fn test_flat_benefit_and_minimum() {
        let coupon = CouponDiscountPolicy::new(
            "FLAT3000",
            CouponBenefit::Amount(krw(3000)),
            DateRange::new(date(4, 1), date(4, 30)).unwrap(),
        )
        .unwrap()
        .with_minimum_purchase(krw(15000));
        let ctx = context().with_coupon("flat3000");
        assert_eq!(coupon.apply_discount(&krw(10000), &ctx).unwrap(), krw(10000));
        assert_eq!(coupon.apply_discount(&krw(20000), &ctx).unwrap(), krw(17000));
    }

    #[test]
    fn test_invalid_benefit() {
        let validity = DateRange::new(date(1, 1), date(12, 31)).unwrap();
        assert!(CouponDiscountPolicy::new("BAD", CouponBenefit::Rate(dec!(2)), validity).is_err());
        assert!(CouponDiscountPolicy::new("ZERO", CouponBenefit::Amount(krw(0)), validity).is_err());
    }
}
