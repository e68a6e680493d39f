// In-memory store
//
// Members, plans, resources and reservations keyed by id. Readers get cloned
// values, so a snapshot built from the store never changes under evaluation.

use crate::error::{DomainError, DomainResult};
use crate::models::{Member, MembershipPlan, Reservation, Resource};
use crate::types::ReservationStatus;
use crate::values::TimeSlot;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    plans: RwLock<HashMap<Uuid, MembershipPlan>>,
    members: RwLock<HashMap<Uuid, Member>>,
    resources: RwLock<HashMap<Uuid, Resource>>,
    reservations: RwLock<HashMap<Uuid, Reservation>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_plan(&self, plan: MembershipPlan) -> Uuid {
        let id = plan.id;
        self.plans.write().await.insert(id, plan);
        id
    }

    /// Add a member; the member's plan must already be stored
    pub async fn insert_member(&self, member: Member) -> DomainResult<Uuid> {
        if !self.plans.read().await.contains_key(&member.plan_id) {
            return Err(DomainError::not_found("membership plan", member.plan_id));
        }
        let id = member.id;
        self.members.write().await.insert(id, member);
        Ok(id)
    }

    pub async fn insert_resource(&self, resource: Resource) -> Uuid {
        let id = resource.id;
        self.resources.write().await.insert(id, resource);
        id
    }

    /// Store a reservation for a known member and resource
    pub async fn add_reservation(&self, reservation: Reservation) -> DomainResult<Uuid> {
        if !self.members.read().await.contains_key(&reservation.member_id) {
            return Err(DomainError::not_found("member", reservation.member_id));
        }
        if !self.resources.read().await.contains_key(&reservation.resource_id) {
            return Err(DomainError::not_found("resource", reservation.resource_id));
        }
        let id = reservation.id;
        self.reservations.write().await.insert(id, reservation);
        Ok(id)
    }

    pub async fn get_plan(&self, id: Uuid) -> DomainResult<MembershipPlan> {
        self.plans
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("membership plan", id))
    }

    pub async fn get_member(&self, id: Uuid) -> DomainResult<Member> {
        self.members
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("member", id))
    }

    pub async fn get_resource(&self, id: Uuid) -> DomainResult<Resource> {
        self.resources
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("resource", id))
    }

    pub async fn get_reservation(&self, id: Uuid) -> DomainResult<Reservation> {
        self.reservations
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("reservation", id))
    }

    /// Member together with their plan
    pub async fn member_with_plan(&self, member_id: Uuid) -> DomainResult<(Member, MembershipPlan)> {
        let member = self.get_member(member_id).await?;
        let plan = self.get_plan(member.plan_id).await?;
        Ok((member, plan))
    }

    pub async fn update_reservation_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> DomainResult<Reservation> {
        let mut reservations = self.reservations.write().await;
        let reservation = reservations
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("reservation", id))?;
        reservation.status = status;
        Ok(reservation.clone())
    }

    pub async fn reservations_for_member(&self, member_id: Uuid) -> Vec<Reservation> {
        self.reservations
            .read()
            .await
            .values()
            .filter(|r| r.member_id == member_id)
            .cloned()
            .collect()
    }

    /// Statuses of the member's active reservations that have not ended by `at`
    pub async fn active_reservation_statuses(
        &self,
        member_id: Uuid,
        at: NaiveDateTime,
    ) -> Vec<ReservationStatus> {
        self.reservations
            .read()
            .await
            .values()
            .filter(|r| r.member_id == member_id && r.is_active() && r.slot.end() > at)
            .map(|r| r.status)
            .collect()
    }

    /// Seats taken on `resource_id` by active reservations overlapping `slot`
    pub async fn occupancy(&self, resource_id: Uuid, slot: &TimeSlot) -> u32 {
        self.reservations
            .read()
            .await
            .values()
            .filter(|r| r.resource_id == resource_id && r.is_active() && r.slot.overlaps(slot))
            .fold(0u32, |seats, r| seats.saturating_add(r.party_size))
    }
}
