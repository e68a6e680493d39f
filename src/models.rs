// Domain entities consumed by the rules engine
//
// Members, plans, resources and reservations are validated on construction
// and never mutated by rule evaluation.

use crate::error::{DomainError, DomainResult};
use crate::types::{MemberStatus, MembershipTier, ReservationStatus, ResourceCategory};
use crate::validation::{require_non_blank, require_unit_rate};
use crate::values::{DateRange, TimeSlot};
use chrono::{Datelike, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A club member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub status: MemberStatus,
    pub tier: MembershipTier,
    pub membership_period: DateRange,
    pub plan_id: Uuid,
}

impl Member {
    /// Create an active, standard-tier member
    pub fn new(name: &str, plan_id: Uuid, membership_period: DateRange) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: require_non_blank("member name", name)?,
            status: MemberStatus::Active,
            tier: MembershipTier::Standard,
            membership_period,
            plan_id,
        })
    }

    pub fn with_status(mut self, status: MemberStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tier(mut self, tier: MembershipTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// Membership plan: privileges, limits and the member discount rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipPlan {
    pub id: Uuid,
    pub name: String,
    pub privileges: BTreeSet<ResourceCategory>,
    pub max_simultaneous_reservations: u32,
    pub advance_booking_days: u32,
    pub discount_rate: Decimal,
    pub active: bool,
}

impl MembershipPlan {
    pub fn new(
        name: &str,
        privileges: impl IntoIterator<Item = ResourceCategory>,
        max_simultaneous_reservations: u32,
        advance_booking_days: u32,
    ) -> DomainResult<Self> {
        if max_simultaneous_reservations == 0 {
            return Err(DomainError::Validation(
                "max_simultaneous_reservations must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: require_non_blank("plan name", name)?,
            privileges: privileges.into_iter().collect(),
            max_simultaneous_reservations,
            advance_booking_days,
            discount_rate: Decimal::ZERO,
            active: true,
        })
    }

    /// Set the plan-level discount rate, which must lie in [0, 1]
    pub fn with_discount_rate(mut self, rate: Decimal) -> DomainResult<Self> {
        self.discount_rate = require_unit_rate(rate)?;
        Ok(self)
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn grants(&self, category: ResourceCategory) -> bool {
        self.privileges.contains(&category)
    }
}

/// Daily opening window of a resource plus the weekdays it opens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub opens_at: NaiveTime,
    /// `None` means the resource stays open until midnight
    pub closes_at: Option<NaiveTime>,
    pub open_days: Vec<Weekday>,
}

impl OperatingHours {
    pub fn new(
        opens_at: NaiveTime,
        closes_at: Option<NaiveTime>,
        open_days: impl IntoIterator<Item = Weekday>,
    ) -> DomainResult<Self> {
        if let Some(close) = closes_at {
            if close <= opens_at {
                return Err(DomainError::InvalidInterval {
                    start: opens_at.to_string(),
                    end: close.to_string(),
                });
            }
        }
        let mut open_days: Vec<Weekday> = open_days.into_iter().collect();
        open_days.sort_by_key(|d| d.num_days_from_monday());
        open_days.dedup();
        if open_days.is_empty() {
            return Err(DomainError::Validation(
                "operating hours need at least one open day".to_string(),
            ));
        }
        Ok(Self {
            opens_at,
            closes_at,
            open_days,
        })
    }

    /// Open around the clock, every day
    pub fn always() -> Self {
        Self {
            opens_at: NaiveTime::MIN,
            closes_at: None,
            open_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
        }
    }

    fn is_around_the_clock(&self) -> bool {
        self.opens_at == NaiveTime::MIN && self.closes_at.is_none()
    }

    /// True when the whole slot lies inside one opening window
    ///
    /// A window open until midnight runs on into the next day when that day
    /// is open from 00:00 as well.
    pub fn covers(&self, slot: &TimeSlot) -> bool {
        let day = slot.start().date();
        if !self.open_days.contains(&day.weekday()) {
            return false;
        }
        if self.is_around_the_clock() && self.open_days.len() == 7 {
            return true;
        }
        if day.and_time(self.opens_at) > slot.start() {
            return false;
        }
        let Some(close) = self.closes_at else {
            let mut closing = day;
            loop {
                let Some(next) = closing.succ_opt() else {
                    return false;
                };
                if slot.end() <= next.and_time(NaiveTime::MIN) {
                    return true;
                }
                if !(self.is_around_the_clock() && self.open_days.contains(&next.weekday())) {
                    return false;
                }
                closing = next;
            }
        };
        slot.end() <= day.and_time(close)
    }
}

/// A bookable resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub category: ResourceCategory,
    pub capacity: u32,
    pub operating_hours: OperatingHours,
    pub active: bool,
}

impl Resource {
    /// Create an active resource that is always open
    pub fn new(name: &str, category: ResourceCategory, capacity: u32) -> DomainResult<Self> {
        if capacity == 0 {
            return Err(DomainError::Validation(
                "resource capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: require_non_blank("resource name", name)?,
            category,
            capacity,
            operating_hours: OperatingHours::always(),
            active: true,
        })
    }

    pub fn with_operating_hours(mut self, hours: OperatingHours) -> Self {
        self.operating_hours = hours;
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}

/// A booking held by a member on a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub member_id: Uuid,
    pub resource_id: Uuid,
    pub slot: TimeSlot,
    pub party_size: u32,
    pub status: ReservationStatus,
}

impl Reservation {
    /// Create a confirmed reservation
    pub fn new(
        member_id: Uuid,
        resource_id: Uuid,
        slot: TimeSlot,
        party_size: u32,
    ) -> DomainResult<Self> {
        if party_size == 0 {
            return Err(DomainError::Validation(
                "party size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            member_id,
            resource_id,
            slot,
            party_size,
            status: ReservationStatus::Confirmed,
        })
    }

    pub fn with_status(mut self, status: ReservationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn period() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_member_creation() {
        let member = Member::new("  Kim Minji ", Uuid::new_v4(), period()).unwrap();
        assert_eq!(member.name, "Kim Minji");
        assert!(member.is_active());
        assert_eq!(member.tier, MembershipTier::Standard);

        assert!(Member::new("", Uuid::new_v4(), period()).is_err());
    }

    #[test]
    fn test_plan_discount_rate_validation() {
        let plan = MembershipPlan::new("Gold", [ResourceCategory::Lounge], 3, 30).unwrap();
        assert!(plan.clone().with_discount_rate(dec!(0.1)).is_ok());
        assert!(plan.with_discount_rate(dec!(1.5)).is_err());
    }

    #[test]
    fn test_plan_requires_positive_limit() {
        assert!(MembershipPlan::new("Zero", [], 0, 30).is_err());
    }

    #[test]
    fn test_resource_requires_capacity() {
        assert!(Resource::new("Room", ResourceCategory::StudyRoom, 0).is_err());
        assert!(Resource::new("Room", ResourceCategory::StudyRoom, 4).is_ok());
    }

    #[test]
    fn test_operating_hours_cover() {
        let hours = OperatingHours::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            Some(NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
            [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
        )
        .unwrap();

        // 2026-03-10 is a Tuesday
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let inside = TimeSlot::new(
            day.and_hms_opt(9, 0, 0).unwrap(),
            day.and_hms_opt(18, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(hours.covers(&inside));

        let late = TimeSlot::new(
            day.and_hms_opt(17, 0, 0).unwrap(),
            day.and_hms_opt(19, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(!hours.covers(&late));

        let saturday = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let weekend = TimeSlot::new(
            saturday.and_hms_opt(10, 0, 0).unwrap(),
            saturday.and_hms_opt(11, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(!hours.covers(&weekend));
    }

    #[test]
    fn test_always_open_covers_until_midnight() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let slot = TimeSlot::new(
            day.and_hms_opt(23, 0, 0).unwrap(),
            day.succ_opt().unwrap().and_hms_opt(0, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(OperatingHours::always().covers(&slot));
    }

    #[test]
    fn test_always_open_covers_overnight_slot() {
        // Tuesday 23:00 to Wednesday 01:00
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let overnight = TimeSlot::new(
            day.and_hms_opt(23, 0, 0).unwrap(),
            day.succ_opt().unwrap().and_hms_opt(1, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(OperatingHours::always().covers(&overnight));
    }

    #[test]
    fn test_open_until_midnight_stops_at_closed_day() {
        let weekdays = OperatingHours::new(
            NaiveTime::MIN,
            None,
            [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
        )
        .unwrap();
        // Thursday night into Friday stays open; Friday night runs into Saturday
        let thursday = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();
        let into_friday = TimeSlot::new(
            thursday.and_hms_opt(22, 0, 0).unwrap(),
            thursday.succ_opt().unwrap().and_hms_opt(2, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(weekdays.covers(&into_friday));

        let friday = NaiveDate::from_ymd_opt(2026, 3, 13).unwrap();
        let into_saturday = TimeSlot::new(
            friday.and_hms_opt(22, 0, 0).unwrap(),
            friday.succ_opt().unwrap().and_hms_opt(2, 0, 0).unwrap(),
        )
        .unwrap();
        assert!(!weekdays.covers(&into_saturday));

        // A late opening does not carry over midnight
        let evenings = OperatingHours::new(
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            None,
            [Weekday::Thu, Weekday::Fri],
        )
        .unwrap();
        assert!(!evenings.covers(&into_friday));
    }

    #[test]
    fn test_operating_hours_reject_inverted_window() {
        let result = OperatingHours::new(
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            Some(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
            [Weekday::Mon],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_reservation_defaults_to_confirmed() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let slot = TimeSlot::starting_at(day.and_hms_opt(10, 0, 0).unwrap(), 60).unwrap();
        let reservation = Reservation::new(Uuid::new_v4(), Uuid::new_v4(), slot, 1).unwrap();
        assert_eq!(reservation.status, ReservationStatus::Confirmed);
        assert!(reservation.is_active());
        assert!(Reservation::new(Uuid::new_v4(), Uuid::new_v4(), slot, 0).is_err());
    }
}
