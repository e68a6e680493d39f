// Member-facing eligibility rules
//
// Standing, privileges, concurrent bookings and how far ahead a member may book.

use super::{ReservationContext, Specification};
use crate::models::MembershipPlan;
use crate::types::{MemberStatus, ReservationStatus, ResourceCategory};
use std::fmt;
use std::sync::Arc;

/// Member must be active and inside the membership period (plus grace days)
#[derive(Debug, Clone, Default)]
pub struct ActiveMemberSpecification {
    lenient: bool,
    grace_period_days: u32,
}

impl ActiveMemberSpecification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tolerate suspended members
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    pub fn with_grace_period(mut self, days: u32) -> Self {
        self.grace_period_days = days;
        self
    }

    fn status_ok(&self, status: MemberStatus) -> bool {
        match status {
            MemberStatus::Active => true,
            MemberStatus::Suspended => self.lenient,
            MemberStatus::Expired | MemberStatus::Withdrawn => false,
        }
    }

    fn period_ok(&self, context: &ReservationContext) -> bool {
        let period = context
            .member()
            .membership_period
            .extended_by_days(self.grace_period_days);
        period.contains(context.evaluated_at().date())
            && period.contains(context.requested().start().date())
    }
}

impl Specification<ReservationContext> for ActiveMemberSpecification {
    fn is_satisfied_by(&self, context: &ReservationContext) -> bool {
        self.status_ok(context.member().status) && self.period_ok(context)
    }

    fn description(&self) -> String {
        let mut text = "Member is active".to_string();
        if self.lenient {
            text.push_str(" or suspended");
        }
        if self.grace_period_days > 0 {
            text.push_str(&format!(
                " within membership period (+{} grace days)",
                self.grace_period_days
            ));
        } else {
            text.push_str(" within membership period");
        }
        text
    }

    fn failure_reason(&self, context: &ReservationContext) -> Option<String> {
        let member = context.member();
        if !self.status_ok(member.status) {
            return Some(format!("Member status is {}", member.status));
        }
        if !self.period_ok(context) {
            let period = &member.membership_period;
            return Some(format!(
                "Membership period {} to {} does not cover the reservation",
                period.start(),
                period.end()
            ));
        }
        None
    }
}

/// Suggests an upgrade when the plan lacks a privilege
pub type UpgradeAdvisor =
    Arc<dyn Fn(&MembershipPlan, ResourceCategory) -> Option<String> + Send + Sync>;

/// Plan must be active and grant the resource category
#[derive(Clone, Default)]
pub struct MembershipPrivilegeSpecification {
    grace_period_days: u32,
    upgrade_advisor: Option<UpgradeAdvisor>,
}

impl MembershipPrivilegeSpecification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grace_period(mut self, days: u32) -> Self {
        self.grace_period_days = days;
        self
    }

    pub fn with_upgrade_advisor(mut self, advisor: UpgradeAdvisor) -> Self {
        self.upgrade_advisor = Some(advisor);
        self
    }

    fn covers_request(&self, context: &ReservationContext) -> bool {
        context
            .member()
            .membership_period
            .extended_by_days(self.grace_period_days)
            .contains(context.requested().start().date())
    }
}

impl fmt::Debug for MembershipPrivilegeSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MembershipPrivilegeSpecification")
            .field("grace_period_days", &self.grace_period_days)
            .field("upgrade_advisor", &self.upgrade_advisor.is_some())
            .finish()
    }
}

impl Specification<ReservationContext> for MembershipPrivilegeSpecification {
    fn is_satisfied_by(&self, context: &ReservationContext) -> bool {
        let plan = context.plan();
        plan.active && plan.grants(context.resource().category) && self.covers_request(context)
    }

    fn description(&self) -> String {
        "Membership plan grants access to the resource category".to_string()
    }

    fn failure_reason(&self, context: &ReservationContext) -> Option<String> {
        let plan = context.plan();
        let category = context.resource().category;
        if !plan.active {
            return Some(format!("Membership plan '{}' is inactive", plan.name));
        }
        if !plan.grants(category) {
            let mut reason = format!(
                "Membership plan '{}' does not include {} access",
                plan.name, category
            );
            if let Some(hint) = self
                .upgrade_advisor
                .as_ref()
                .and_then(|advisor| advisor(plan, category))
            {
                reason.push_str(&format!(" ({})", hint));
            }
            return Some(reason);
        }
        if !self.covers_request(context) {
            return Some("Membership privileges expire before the reservation date".to_string());
        }
        None
    }
}

/// Member may hold fewer live reservations than the plan allows
#[derive(Debug, Clone)]
pub struct SimultaneousReservationLimitSpecification {
    counted: Vec<ReservationStatus>,
    cap: Option<u32>,
}

impl Default for SimultaneousReservationLimitSpecification {
    fn default() -> Self {
        Self {
            counted: vec![
                ReservationStatus::Pending,
                ReservationStatus::Confirmed,
                ReservationStatus::CheckedIn,
            ],
            cap: None,
        }
    }
}

impl SimultaneousReservationLimitSpecification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only confirmed and checked-in reservations count toward the limit
    pub fn excluding_pending(mut self) -> Self {
        self.counted.retain(|s| *s != ReservationStatus::Pending);
        self
    }

    /// Never allow more than `cap`, whatever the plan says
    pub fn with_cap(mut self, cap: u32) -> Self {
        self.cap = Some(cap);
        self
    }

    fn held(&self, context: &ReservationContext) -> usize {
        context
            .member_reservations()
            .iter()
            .filter(|status| self.counted.contains(*status))
            .count()
    }

    fn limit(&self, context: &ReservationContext) -> u32 {
        let plan_limit = context.plan().max_simultaneous_reservations;
        self.cap.map_or(plan_limit, |cap| plan_limit.min(cap))
    }
}

impl Specification<ReservationContext> for SimultaneousReservationLimitSpecification {
    fn is_satisfied_by(&self, context: &ReservationContext) -> bool {
        self.held(context) < self.limit(context) as usize
    }

    fn description(&self) -> String {
        match self.cap {
            Some(cap) => format!("Member is below the simultaneous reservation limit (max {})", cap),
            None => "Member is below the simultaneous reservation limit".to_string(),
        }
    }

    fn failure_reason(&self, context: &ReservationContext) -> Option<String> {
        let held = self.held(context);
        let limit = self.limit(context);
        (held >= limit as usize).then(|| {
            format!(
                "Simultaneous reservation limit reached: {} of {}",
                held, limit
            )
        })
    }
}

/// Request start must fall within the plan's advance-booking window
#[derive(Debug, Clone, Default)]
pub struct AdvanceBookingLimitSpecification {
    vip_bonus_days: u32,
    cap_days: Option<u32>,
}

impl AdvanceBookingLimitSpecification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra days for premium and VIP tiers
    pub fn with_vip_bonus(mut self, days: u32) -> Self {
        self.vip_bonus_days = days;
        self
    }

    pub fn with_cap(mut self, days: u32) -> Self {
        self.cap_days = Some(days);
        self
    }

    fn allowance(&self, context: &ReservationContext) -> i64 {
        let mut days = context.plan().advance_booking_days;
        if context.member().tier.is_vip() {
            days = days.saturating_add(self.vip_bonus_days);
        }
        if let Some(cap) = self.cap_days {
            days = days.min(cap);
        }
        i64::from(days)
    }

    fn days_ahead(context: &ReservationContext) -> i64 {
        (context.requested().start().date() - context.evaluated_at().date()).num_days()
    }
}

impl Specification<ReservationContext> for AdvanceBookingLimitSpecification {
    fn is_satisfied_by(&self, context: &ReservationContext) -> bool {
        Self::days_ahead(context) <= self.allowance(context)
    }

    fn description(&self) -> String {
        "Reservation is within the advance booking window".to_string()
    }

    fn failure_reason(&self, context: &ReservationContext) -> Option<String> {
        let ahead = Self::days_ahead(context);
        let allowance = self.allowance(context);
        (ahead > allowance).then(|| {
            format!(
                "Reservation is {} days ahead; at most {} days allowed",
                ahead, allowance
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::context::fixtures;
    use crate::types::MembershipTier;
    use crate::values::DateRange;
    use chrono::NaiveDate;

    #[test]
    fn test_active_member_in_good_standing() {
        let spec = ActiveMemberSpecification::new();
        assert!(spec.is_satisfied_by(&fixtures::context()));
        assert!(spec.failure_reason(&fixtures::context()).is_none());
    }

    #[test]
    fn test_suspended_member_only_passes_when_lenient() {
        let plan = fixtures::plan();
        let member = fixtures::member(&plan).with_status(MemberStatus::Suspended);
        let context = ReservationContext::builder(
            member,
            plan,
            fixtures::resource(10),
            fixtures::slot(1, 10),
            fixtures::now(),
        )
        .build()
        .unwrap();

        let strict = ActiveMemberSpecification::new();
        assert!(!strict.is_satisfied_by(&context));
        assert_eq!(
            strict.failure_reason(&context).unwrap(),
            "Member status is suspended"
        );
        assert!(ActiveMemberSpecification::new()
            .lenient()
            .is_satisfied_by(&context));
    }

    #[test]
    fn test_grace_period_extends_membership() {
        let plan = fixtures::plan();
        let mut member = fixtures::member(&plan);
        // Ends the day before the request
        member.membership_period = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
        )
        .unwrap();
        let context = ReservationContext::builder(
            member,
            plan,
            fixtures::resource(10),
            fixtures::slot(1, 10),
            fixtures::now(),
        )
        .build()
        .unwrap();

        assert!(!ActiveMemberSpecification::new().is_satisfied_by(&context));
        assert!(ActiveMemberSpecification::new()
            .with_grace_period(7)
            .is_satisfied_by(&context));
        assert!(!MembershipPrivilegeSpecification::new().is_satisfied_by(&context));
        assert!(MembershipPrivilegeSpecification::new()
            .with_grace_period(7)
            .is_satisfied_by(&context));
    }

    #[test]
    fn test_privilege_missing_category() {
        let plan = MembershipPlan::new("Fitness", [ResourceCategory::FitnessStudio], 2, 14).unwrap();
        let member = fixtures::member(&plan);
        let context = ReservationContext::builder(
            member,
            plan,
            fixtures::resource(10),
            fixtures::slot(1, 10),
            fixtures::now(),
        )
        .build()
        .unwrap();

        let advisor: UpgradeAdvisor = Arc::new(|_plan: &MembershipPlan, category: ResourceCategory| {
            Some(format!("upgrade to Standard for {}", category))
        });
        let spec = MembershipPrivilegeSpecification::new().with_upgrade_advisor(advisor);
        assert!(!spec.is_satisfied_by(&context));
        let reason = spec.failure_reason(&context).unwrap();
        assert!(reason.contains("does not include study_room access"));
        assert!(reason.contains("upgrade to Standard"));
    }

    #[test]
    fn test_privilege_inactive_plan() {
        let plan = fixtures::plan().deactivated();
        let member = fixtures::member(&plan);
        let context = ReservationContext::builder(
            member,
            plan,
            fixtures::resource(10),
            fixtures::slot(1, 10),
            fixtures::now(),
        )
        .build()
        .unwrap();
        let reason = MembershipPrivilegeSpecification::new()
            .failure_reason(&context)
            .unwrap();
        assert!(reason.contains("inactive"));
    }

    #[test]
    fn test_simultaneous_limit() {
        use ReservationStatus::*;
        // Plan allows 3
        let under = fixtures::builder()
            .member_reservations([Confirmed, Pending])
            .build()
            .unwrap();
        let at_limit = fixtures::builder()
            .member_reservations([Confirmed, Pending, CheckedIn])
            .build()
            .unwrap();

        let spec = SimultaneousReservationLimitSpecification::new();
        assert!(spec.is_satisfied_by(&under));
        assert!(!spec.is_satisfied_by(&at_limit));
        assert_eq!(
            spec.failure_reason(&at_limit).unwrap(),
            "Simultaneous reservation limit reached: 3 of 3"
        );

        let lenient = SimultaneousReservationLimitSpecification::new().excluding_pending();
        assert!(lenient.is_satisfied_by(&at_limit));

        let capped = SimultaneousReservationLimitSpecification::new().with_cap(2);
        assert!(!capped.is_satisfied_by(&under));
    }

    #[test]
    fn test_advance_booking_limit() {
        // Plan allows 30 days
        let within = fixtures::context();
        let plan = fixtures::plan();
        let member = fixtures::member(&plan);
        let far = ReservationContext::builder(
            member.clone(),
            plan.clone(),
            fixtures::resource(10),
            fixtures::slot(45, 10),
            fixtures::now(),
        )
        .build()
        .unwrap();

        let spec = AdvanceBookingLimitSpecification::new();
        assert!(spec.is_satisfied_by(&within));
        assert!(!spec.is_satisfied_by(&far));
        assert_eq!(
            spec.failure_reason(&far).unwrap(),
            "Reservation is 45 days ahead; at most 30 days allowed"
        );

        // VIP bonus reaches 60 days, but only for premium tiers
        let vip = ReservationContext::builder(
            member.with_tier(MembershipTier::Vip),
            plan,
            fixtures::resource(10),
            fixtures::slot(45, 10),
            fixtures::now(),
        )
        .build()
        .unwrap();
        let bonus = AdvanceBookingLimitSpecification::new().with_vip_bonus(30);
        assert!(!bonus.is_satisfied_by(&far));
        assert!(bonus.is_satisfied_by(&vip));
        assert!(!bonus.with_cap(14).is_satisfied_by(&vip));
    }
}
