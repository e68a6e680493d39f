// Reservation context snapshot
//
// Point-in-time bundle of every fact the eligibility rules read. Built fresh
// for each evaluation and never cached: occupancy and "now" move between calls.

use crate::error::{DomainError, DomainResult};
use crate::models::{Member, MembershipPlan, Resource};
use crate::types::ReservationStatus;
use crate::values::TimeSlot;
use chrono::NaiveDateTime;

/// Immutable facts for one eligibility evaluation
#[derive(Debug, Clone)]
pub struct ReservationContext {
    member: Member,
    plan: MembershipPlan,
    resource: Resource,
    requested: TimeSlot,
    party_size: u32,
    member_reservations: Vec<ReservationStatus>,
    occupancy: u32,
    evaluated_at: NaiveDateTime,
}

impl ReservationContext {
    /// Start a snapshot for `member` requesting `requested` on `resource`
    pub fn builder(
        member: Member,
        plan: MembershipPlan,
        resource: Resource,
        requested: TimeSlot,
        evaluated_at: NaiveDateTime,
    ) -> ReservationContextBuilder {
        ReservationContextBuilder {
            member,
            plan,
            resource,
            requested,
            evaluated_at,
            party_size: 1,
            member_reservations: Vec::new(),
            occupancy: 0,
        }
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn plan(&self) -> &MembershipPlan {
        &self.plan
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn requested(&self) -> &TimeSlot {
        &self.requested
    }

    /// Seats this request would take
    pub fn party_size(&self) -> u32 {
        self.party_size
    }

    /// Statuses of the member's reservations that are still active
    pub fn member_reservations(&self) -> &[ReservationStatus] {
        &self.member_reservations
    }

    /// Seats already taken on the resource during the requested slot
    pub fn occupancy(&self) -> u32 {
        self.occupancy
    }

    /// The "now" every time-based rule measures against
    pub fn evaluated_at(&self) -> NaiveDateTime {
        self.evaluated_at
    }
}

/// Builder for [`ReservationContext`]
#[derive(Debug, Clone)]
pub struct ReservationContextBuilder {
    member: Member,
    plan: MembershipPlan,
    resource: Resource,
    requested: TimeSlot,
    evaluated_at: NaiveDateTime,
    party_size: u32,
    member_reservations: Vec<ReservationStatus>,
    occupancy: u32,
}

impl ReservationContextBuilder {
    pub fn party_size(mut self, party_size: u32) -> Self {
        self.party_size = party_size;
        self
    }

    /// Inactive statuses are dropped; only live reservations are kept
    pub fn member_reservations(
        mut self,
        statuses: impl IntoIterator<Item = ReservationStatus>,
    ) -> Self {
        self.member_reservations = statuses.into_iter().filter(|s| s.is_active()).collect();
        self
    }

    pub fn occupancy(mut self, occupancy: u32) -> Self {
        self.occupancy = occupancy;
        self
    }

    /// Validate and freeze the snapshot
    pub fn build(self) -> DomainResult<ReservationContext> {
        if self.member.plan_id != self.plan.id {
            return Err(DomainError::Validation(format!(
                "member {} is not enrolled in plan {}",
                self.member.id, self.plan.id
            )));
        }
        if self.party_size == 0 {
            return Err(DomainError::Validation(
                "party size must be at least 1".to_string(),
            ));
        }

        Ok(ReservationContext {
            member: self.member,
            plan: self.plan,
            resource: self.resource,
            requested: self.requested,
            party_size: self.party_size,
            member_reservations: self.member_reservations,
            occupancy: self.occupancy,
            evaluated_at: self.evaluated_at,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_builder_defaults() {
        let context = fixtures::context();
        assert_eq!(context.party_size(), 1);
        assert_eq!(context.occupancy(), 0);
        assert!(context.member_reservations().is_empty());
        assert_eq!(context.evaluated_at(), fixtures::now());
    }

    #[test]
    fn test_builder_drops_inactive_statuses() {
        let context = fixtures::builder()
            .member_reservations([
                ReservationStatus::Confirmed,
                ReservationStatus::Cancelled,
                ReservationStatus::Pending,
                ReservationStatus::Completed,
            ])
            .build()
            .unwrap();
        assert_eq!(
            context.member_reservations(),
            &[ReservationStatus::Confirmed, ReservationStatus::Pending]
        );
    }

    #[test]
    fn test_plan_mismatch_is_rejected() {
        let plan = fixtures::plan();
        let mut member = fixtures::member(&plan);
        member.plan_id = Uuid::new_v4();
        let result = ReservationContext::builder(
            member,
            plan,
            fixtures::resource(4),
            fixtures::slot(1, 10),
            fixtures::now(),
        )
        .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_party_size_is_rejected() {
        assert!(fixtures::builder().party_size(0).build().is_err());
    }
}
