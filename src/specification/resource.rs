// Resource capacity rule

use super::{ReservationContext, Specification};
use crate::error::DomainResult;
use crate::validation::require_ceiling_ratio;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Resource must be active and have room for the party under the utilization ceiling
///
/// Usable seats are `floor(capacity × ceiling) − headroom`; the request fits
/// when `occupancy + party_size` does not exceed them.
#[derive(Debug, Clone)]
pub struct ResourceCapacitySpecification {
    utilization_ceiling: Decimal,
    reserved_headroom: u32,
}

impl Default for ResourceCapacitySpecification {
    fn default() -> Self {
        Self {
            utilization_ceiling: Decimal::ONE,
            reserved_headroom: 0,
        }
    }
}

impl ResourceCapacitySpecification {
    /// Full capacity, no headroom
    pub fn new() -> Self {
        Self::default()
    }

    /// Ceiling must lie in (0, 1]
    pub fn with_ceiling(mut self, ratio: Decimal) -> DomainResult<Self> {
        self.utilization_ceiling = require_ceiling_ratio(ratio)?;
        Ok(self)
    }

    /// Seats kept free for walk-ins or staff
    pub fn with_headroom(mut self, seats: u32) -> Self {
        self.reserved_headroom = seats;
        self
    }

    /// Seats bookable on a resource of the given capacity
    pub fn usable_seats(&self, capacity: u32) -> u32 {
        let scaled = (Decimal::from(capacity) * self.utilization_ceiling)
            .floor()
            .to_u32()
            .unwrap_or(capacity);
        scaled.saturating_sub(self.reserved_headroom)
    }

    fn requested_seats(context: &ReservationContext) -> u32 {
        context.occupancy().saturating_add(context.party_size())
    }
}

impl Specification<ReservationContext> for ResourceCapacitySpecification {
    fn is_satisfied_by(&self, context: &ReservationContext) -> bool {
        let resource = context.resource();
        resource.active && Self::requested_seats(context) <= self.usable_seats(resource.capacity)
    }

    fn description(&self) -> String {
        format!(
            "Resource has capacity (utilization ceiling {}%)",
            (self.utilization_ceiling * Decimal::ONE_HUNDRED).normalize()
        )
    }

    fn failure_reason(&self, context: &ReservationContext) -> Option<String> {
        let resource = context.resource();
        if !resource.active {
            return Some(format!("Resource '{}' is not available", resource.name));
        }
        let usable = self.usable_seats(resource.capacity);
        let requested = Self::requested_seats(context);
        (requested > usable).then(|| {
            format!(
                "Resource '{}' is full: {} of {} usable seats taken, {} requested",
                resource.name,
                context.occupancy(),
                usable,
                context.party_size()
            )
        })
    }
}
