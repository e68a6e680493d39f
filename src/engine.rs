// Reservation Rules Engine - Orchestrator
//
// Builds point-in-time snapshots from the store, runs the eligibility policy
// and the discount plan, and records metrics for both.

use crate::discount::{
    CompositeDiscountPolicy, DiscountBreakdown, DiscountContext, MembershipDiscountPolicy,
};
use crate::eligibility::{EligibilityDecision, EligibilityPolicy, ReservationPolicy};
use crate::error::DomainResult;
use crate::metrics::PerformanceMetrics;
use crate::models::Reservation;
use crate::settings::Settings;
use crate::specification::ReservationContext;
use crate::store::InMemoryStore;
use crate::values::{Money, TimeSlot};
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A member asking for seats on a resource
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRequest {
    pub member_id: Uuid,
    pub resource_id: Uuid,
    pub slot: TimeSlot,
    pub party_size: u32,
    /// When the request is made; time-based rules measure from here
    pub requested_at: NaiveDateTime,
}

impl ReservationRequest {
    pub fn new(member_id: Uuid, resource_id: Uuid, slot: TimeSlot, requested_at: NaiveDateTime) -> Self {
        Self {
            member_id,
            resource_id,
            slot,
            party_size: 1,
            requested_at,
        }
    }

    pub fn with_party_size(mut self, party_size: u32) -> Self {
        self.party_size = party_size;
        self
    }
}

/// Result of `reserve`
#[derive(Debug, Clone, PartialEq)]
pub enum ReservationOutcome {
    Confirmed(Reservation),
    Denied(EligibilityDecision),
}

/// Reservation Rules Engine
///
/// Orchestrates the eligibility policy and the discount plan over data held
/// in an [`InMemoryStore`].
pub struct ReservationRulesEngine {
    store: Arc<InMemoryStore>,
    policy: Arc<dyn ReservationPolicy>,
    discount: Arc<CompositeDiscountPolicy>,
    metrics: PerformanceMetrics,
    commit_lock: Mutex<()>,
}

impl ReservationRulesEngine {
    pub fn new<P>(store: Arc<InMemoryStore>, policy: P, discount: CompositeDiscountPolicy) -> Self
    where
        P: ReservationPolicy + 'static,
    {
        Self {
            store,
            policy: Arc::new(policy),
            discount: Arc::new(discount),
            metrics: PerformanceMetrics::new(),
            commit_lock: Mutex::new(()),
        }
    }

    /// Level policy and a membership-discount plan, both taken from `settings`
    pub fn from_settings(store: Arc<InMemoryStore>, settings: &Settings) -> DomainResult<Self> {
        let policy = EligibilityPolicy::for_level(settings.eligibility_level)?;

        let mut builder = CompositeDiscountPolicy::builder("Member pricing")
            .strategy(settings.discount_strategy)
            .policy(MembershipDiscountPolicy::new());
        if let Some(cap) = settings.max_total_discount {
            builder = builder.max_total_discount(cap);
        }
        if let Some(floor) = settings.minimum_price {
            builder = builder.minimum_price(floor);
        }

        tracing::info!(
            "Reservation rules engine configured: {} eligibility, {} discounts",
            settings.eligibility_level,
            settings.discount_strategy
        );
        Ok(Self::new(store, policy, builder.build()?)
            .with_metrics(PerformanceMetrics::with_threshold(settings.slow_threshold_ms)))
    }

    pub fn with_metrics(mut self, metrics: PerformanceMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Get performance metrics
    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Snapshot of everything the eligibility rules read for `request`
    pub async fn snapshot(&self, request: &ReservationRequest) -> DomainResult<ReservationContext> {
        let (member, plan) = self.store.member_with_plan(request.member_id).await?;
        let resource = self.store.get_resource(request.resource_id).await?;
        let held = self
            .store
            .active_reservation_statuses(request.member_id, request.requested_at)
            .await;
        let occupancy = self.store.occupancy(request.resource_id, &request.slot).await;

        ReservationContext::builder(member, plan, resource, request.slot, request.requested_at)
            .party_size(request.party_size)
            .member_reservations(held)
            .occupancy(occupancy)
            .build()
    }

    /// Decide whether `request` may be booked, with every failure reason
    pub async fn check_eligibility(
        &self,
        request: &ReservationRequest,
    ) -> DomainResult<EligibilityDecision> {
        let _timer = self.metrics.start_eligibility_check();

        let context = self.snapshot(request).await?;
        let decision = self.policy.evaluate(&context);

        if decision.allowed {
            tracing::debug!(
                member_id = %request.member_id,
                resource_id = %request.resource_id,
                "Reservation eligible"
            );
        } else {
            self.metrics.record_denied();
            tracing::warn!(
                member_id = %request.member_id,
                resource_id = %request.resource_id,
                "Reservation denied: {}",
                decision.summary()
            );
        }

        Ok(decision)
    }

    /// Price `price` for the member on `purchase_date`
    pub async fn quote(
        &self,
        member_id: Uuid,
        price: Money,
        purchase_date: NaiveDate,
        coupon_code: Option<&str>,
    ) -> DomainResult<DiscountBreakdown> {
        let _timer = self.metrics.start_pricing_calculation();

        let (member, plan) = self.store.member_with_plan(member_id).await?;
        let mut context = DiscountContext::new(member, plan, purchase_date)?;
        if let Some(code) = coupon_code {
            context = context.with_coupon(code);
        }

        let breakdown = self.discount.evaluate(&price, &context)?;
        tracing::debug!(
            member_id = %member_id,
            "Quoted {} -> {} ({} discounts applied, capped: {}, floored: {})",
            breakdown.original,
            breakdown.final_price,
            breakdown.applied.len(),
            breakdown.capped,
            breakdown.floored
        );
        Ok(breakdown)
    }

    /// Check and store a confirmed reservation in one step
    ///
    /// Commits are serialized so two requests cannot both take the last seat.
    pub async fn reserve(&self, request: &ReservationRequest) -> DomainResult<ReservationOutcome> {
        let _guard = self.commit_lock.lock().await;

        let decision = self.check_eligibility(request).await?;
        if !decision.allowed {
            return Ok(ReservationOutcome::Denied(decision));
        }

        let reservation = Reservation::new(
            request.member_id,
            request.resource_id,
            request.slot,
            request.party_size,
        )?;
        self.store.add_reservation(reservation.clone()).await?;
        self.metrics.record_reservation();

        tracing::info!(
            reservation_id = %reservation.id,
            member_id = %reservation.member_id,
            "Reservation confirmed for {} seat(s)",
            reservation.party_size
        );
        Ok(ReservationOutcome::Confirmed(reservation))
    }
}
