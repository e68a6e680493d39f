// Membership Reservation Rules
//
// Eligibility rules built from a specification algebra, and discount plans
// built from primitive price policies combined under a strategy with a global
// cap and floor. Evaluation is pure; an in-memory store and an orchestrating
// engine supply the snapshots.

pub mod config_store;
pub mod discount;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod models;
pub mod settings;
pub mod specification;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod validation;
pub mod values;

pub use config_store::{DiscountPlanConfig, DiscountRuleConfig, EligibilityConfig};
pub use discount::{
    CompositeDiscountPolicy, DiscountBreakdown, DiscountContext, DiscountPolicy,
    SharedDiscountPolicy,
};
pub use eligibility::{EligibilityDecision, EligibilityPolicy, PolicyBuilder, ReservationPolicy, Rule};
pub use engine::{ReservationOutcome, ReservationRequest, ReservationRulesEngine};
pub use error::{DomainError, DomainResult};
pub use metrics::{MetricsSummary, PerformanceMetrics};
pub use models::{Member, MembershipPlan, OperatingHours, Reservation, Resource};
pub use settings::Settings;
pub use specification::{ReservationContext, SharedSpecification, Specification};
pub use store::InMemoryStore;
pub use types::{
    CombinationMode, CombinationStrategy, MemberStatus, MembershipTier, PolicyLevel,
    ReservationStatus, ResourceCategory,
};
pub use values::{Currency, DateRange, Money, TimeSlot};
