// Eligibility Policies
//
// Assemblies of specification leaves deciding whether a reservation may be made.
// Every assembly is one `EligibilityPolicy`; presets differ only in which leaves
// they hold and the profile those leaves are built from.

pub mod flexible;
pub mod presets;

pub use flexible::{profile_for, PolicyBuilder, LEVEL_TABLE};
pub use presets::{
    Rule, RuleProfile, FULL_RULE_SET, PREMIUM_PROFILE, RESTRICTIVE_PROFILE, STANDARD_PROFILE,
};

use crate::error::{DomainError, DomainResult};
use crate::specification::{
    all_of, any_of, ReservationContext, SharedSpecification, Specification,
};
use crate::types::CombinationMode;
use crate::validation::require_non_blank;
use serde::Serialize;
use std::fmt;

/// Outcome of one eligibility check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityDecision {
    pub policy: String,
    pub allowed: bool,
    /// Failure reason of every leaf that did not hold; empty when allowed
    pub reasons: Vec<String>,
}

impl EligibilityDecision {
    /// Reasons joined into one line
    pub fn summary(&self) -> String {
        if self.allowed {
            format!("Reservation allowed under {} policy", self.policy)
        } else {
            self.reasons.join("; ")
        }
    }
}

/// Decides whether a reservation request is eligible
pub trait ReservationPolicy: Send + Sync {
    fn name(&self) -> &str;

    fn can_reserve(&self, context: &ReservationContext) -> bool;

    /// All failure reasons joined with "; ", or a success message when allowed
    fn violation_reason(&self, context: &ReservationContext) -> String;

    fn evaluate(&self, context: &ReservationContext) -> EligibilityDecision;
}

/// Named rule tree plus the leaves it was folded from
///
/// `can_reserve` runs the composed tree once with short-circuiting; the
/// leaves are only walked one by one to explain a denial.
#[derive(Clone)]
pub struct EligibilityPolicy {
    name: String,
    mode: CombinationMode,
    rules: Vec<SharedSpecification<ReservationContext>>,
    tree: SharedSpecification<ReservationContext>,
}

impl EligibilityPolicy {
    /// Fold `rules` into a single tree according to `mode`
    pub fn new(
        name: &str,
        rules: Vec<SharedSpecification<ReservationContext>>,
        mode: CombinationMode,
    ) -> DomainResult<Self> {
        let name = require_non_blank("policy name", name)?;
        if rules.is_empty() {
            return Err(DomainError::EmptyPolicyList("eligibility rules"));
        }
        let tree = match mode {
            CombinationMode::All => all_of(rules.clone())?,
            CombinationMode::Any => any_of(rules.clone())?,
        };
        Ok(Self {
            name,
            mode,
            rules,
            tree,
        })
    }

    /// Build every rule in `rules` from `profile`, AND-combined
    pub fn from_profile(name: &str, profile: &RuleProfile, rules: &[Rule]) -> DomainResult<Self> {
        let specs = rules
            .iter()
            .map(|rule| rule.build(profile))
            .collect::<DomainResult<Vec<_>>>()?;
        Self::new(name, specs, CombinationMode::All)
    }

    /// Six leaf categories, 90% ceiling, one-year horizon, 30-minute lead
    pub fn standard() -> DomainResult<Self> {
        Self::from_profile("standard", &STANDARD_PROFILE, &FULL_RULE_SET)
    }

    /// Weekday business hours only, tighter limits, pending bookings count
    pub fn restrictive() -> DomainResult<Self> {
        Self::from_profile("restrictive", &RESTRICTIVE_PROFILE, &FULL_RULE_SET)
    }

    /// Grace days, full capacity, two-year horizon and a VIP advance bonus
    pub fn premium() -> DomainResult<Self> {
        Self::from_profile("premium", &PREMIUM_PROFILE, &FULL_RULE_SET)
    }

    pub fn mode(&self) -> CombinationMode {
        self.mode
    }

    /// Composed tree description
    pub fn description(&self) -> String {
        self.tree.description()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn failure_reasons(&self, context: &ReservationContext) -> Vec<String> {
        self.rules
            .iter()
            .filter_map(|rule| rule.failure_reason(context))
            .collect()
    }
}

impl fmt::Debug for EligibilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EligibilityPolicy")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl ReservationPolicy for EligibilityPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_reserve(&self, context: &ReservationContext) -> bool {
        self.tree.is_satisfied_by(context)
    }

    fn violation_reason(&self, context: &ReservationContext) -> String {
        self.evaluate(context).summary()
    }

    fn evaluate(&self, context: &ReservationContext) -> EligibilityDecision {
        let allowed = self.can_reserve(context);
        let reasons = if allowed {
            Vec::new()
        } else {
            let mut reasons = self.failure_reasons(context);
            if reasons.is_empty() {
                reasons.push(format!("Reservation denied by {} policy", self.name));
            }
            reasons
        };

        tracing::debug!(
            policy = %self.name,
            allowed,
            failures = reasons.len(),
            "Eligibility evaluated"
        );

        EligibilityDecision {
            policy: self.name.clone(),
            allowed,
            reasons,
        }
    }
}
