// Rule profiles and the named leaf rules they parameterise

use crate::error::{DomainError, DomainResult};
use crate::specification::{
    ActiveMemberSpecification, AdvanceBookingLimitSpecification,
    MembershipPrivilegeSpecification, ReservationContext, ResourceCapacitySpecification,
    SharedSpecification, SimultaneousReservationLimitSpecification,
    TimeSlotRestrictionSpecification, ValidReservationTimeSpecification,
};
use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Knobs shared by every leaf of one assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleProfile {
    pub grace_period_days: u32,
    pub lenient_status: bool,
    /// Utilization ceiling, in percent
    pub capacity_ceiling_percent: u32,
    pub reserved_headroom: u32,
    pub max_horizon_days: u32,
    pub min_lead_minutes: u32,
    /// Business hours as whole hours, `[open, close]`
    pub business_hours: Option<(u32, u32)>,
    pub weekdays_only: bool,
    pub simultaneous_cap: Option<u32>,
    pub count_pending: bool,
    pub vip_bonus_days: u32,
    pub advance_cap_days: Option<u32>,
}

pub const STANDARD_PROFILE: RuleProfile = RuleProfile {
    grace_period_days: 0,
    lenient_status: false,
    capacity_ceiling_percent: 90,
    reserved_headroom: 0,
    max_horizon_days: 365,
    min_lead_minutes: 30,
    business_hours: None,
    weekdays_only: false,
    simultaneous_cap: None,
    count_pending: false,
    vip_bonus_days: 0,
    advance_cap_days: None,
};

pub const RESTRICTIVE_PROFILE: RuleProfile = RuleProfile {
    grace_period_days: 0,
    lenient_status: false,
    capacity_ceiling_percent: 80,
    reserved_headroom: 0,
    max_horizon_days: 30,
    min_lead_minutes: 120,
    business_hours: Some((9, 18)),
    weekdays_only: true,
    simultaneous_cap: Some(2),
    count_pending: true,
    vip_bonus_days: 0,
    advance_cap_days: Some(14),
};

pub const PREMIUM_PROFILE: RuleProfile = RuleProfile {
    grace_period_days: 7,
    lenient_status: true,
    capacity_ceiling_percent: 100,
    reserved_headroom: 0,
    max_horizon_days: 730,
    min_lead_minutes: 15,
    business_hours: None,
    weekdays_only: false,
    simultaneous_cap: None,
    count_pending: false,
    vip_bonus_days: 30,
    advance_cap_days: None,
};

/// The six leaf categories every full assembly checks
pub const FULL_RULE_SET: [Rule; 6] = [
    Rule::ActiveMember,
    Rule::MembershipPrivilege,
    Rule::ResourceCapacity,
    Rule::ValidTime,
    Rule::SimultaneousLimit,
    Rule::AdvanceBooking,
];

/// A leaf rule that can be built from a [`RuleProfile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    ActiveMember,
    MembershipPrivilege,
    ResourceCapacity,
    ValidTime,
    SimultaneousLimit,
    AdvanceBooking,
    NoWeekends,
}

impl Rule {
    /// Instantiate the leaf with the profile's parameters
    pub fn build(
        &self,
        profile: &RuleProfile,
    ) -> DomainResult<SharedSpecification<ReservationContext>> {
        let spec: SharedSpecification<ReservationContext> = match self {
            Rule::ActiveMember => {
                let mut spec =
                    ActiveMemberSpecification::new().with_grace_period(profile.grace_period_days);
                if profile.lenient_status {
                    spec = spec.lenient();
                }
                Arc::new(spec)
            }
            Rule::MembershipPrivilege => Arc::new(
                MembershipPrivilegeSpecification::new()
                    .with_grace_period(profile.grace_period_days),
            ),
            Rule::ResourceCapacity => Arc::new(
                ResourceCapacitySpecification::new()
                    .with_ceiling(Decimal::new(i64::from(profile.capacity_ceiling_percent), 2))?
                    .with_headroom(profile.reserved_headroom),
            ),
            Rule::ValidTime => {
                let mut spec = ValidReservationTimeSpecification::new()
                    .with_horizon_days(profile.max_horizon_days)
                    .with_lead_minutes(profile.min_lead_minutes);
                if let Some((open, close)) = profile.business_hours {
                    spec = spec.with_business_hours(whole_hour(open)?, whole_hour(close)?)?;
                }
                if profile.weekdays_only {
                    spec = spec.weekdays_only();
                }
                Arc::new(spec)
            }
            Rule::SimultaneousLimit => {
                let mut spec = SimultaneousReservationLimitSpecification::new();
                if !profile.count_pending {
                    spec = spec.excluding_pending();
                }
                if let Some(cap) = profile.simultaneous_cap {
                    spec = spec.with_cap(cap);
                }
                Arc::new(spec)
            }
            Rule::AdvanceBooking => {
                let mut spec =
                    AdvanceBookingLimitSpecification::new().with_vip_bonus(profile.vip_bonus_days);
                if let Some(cap) = profile.advance_cap_days {
                    spec = spec.with_cap(cap);
                }
                Arc::new(spec)
            }
            Rule::NoWeekends => Arc::new(TimeSlotRestrictionSpecification::deny_weekends()),
        };
        Ok(spec)
    }
}

fn whole_hour(hour: u32) -> DomainResult<NaiveTime> {
    NaiveTime::from_hms_opt(hour, 0, 0).ok_or_else(|| {
        DomainError::InvalidConfiguration(format!("Invalid business hour: {}", hour))
    })
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::ActiveMember => write!(f, "active_member"),
            Rule::MembershipPrivilege => write!(f, "membership_privilege"),
            Rule::ResourceCapacity => write!(f, "resource_capacity"),
            Rule::ValidTime => write!(f, "valid_time"),
            Rule::SimultaneousLimit => write!(f, "simultaneous_limit"),
            Rule::AdvanceBooking => write!(f, "advance_booking"),
            Rule::NoWeekends => write!(f, "no_weekends"),
        }
    }
}

impl std::str::FromStr for Rule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active_member" => Ok(Rule::ActiveMember),
            "membership_privilege" => Ok(Rule::MembershipPrivilege),
            "resource_capacity" => Ok(Rule::ResourceCapacity),
            "valid_time" => Ok(Rule::ValidTime),
            "simultaneous_limit" => Ok(Rule::SimultaneousLimit),
            "advance_booking" => Ok(Rule::AdvanceBooking),
            "no_weekends" => Ok(Rule::NoWeekends),
            _ => Err(format!("Invalid eligibility rule: {}", s)),
        }
    }
}
