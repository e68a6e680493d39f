// Flexible eligibility: policy levels and a free-form builder

use super::presets::{Rule, RuleProfile, FULL_RULE_SET, RESTRICTIVE_PROFILE, STANDARD_PROFILE};
use super::EligibilityPolicy;
use crate::error::{DomainError, DomainResult};
use crate::specification::{ReservationContext, SharedSpecification, Specification};
use crate::types::{CombinationMode, PolicyLevel};
use std::sync::Arc;

/// Level -> (profile, rules). `Custom` has no entry.
pub static LEVEL_TABLE: &[(PolicyLevel, &RuleProfile, &[Rule])] = &[
    (
        PolicyLevel::Minimal,
        &STANDARD_PROFILE,
        &[Rule::ActiveMember, Rule::ResourceCapacity],
    ),
    (
        PolicyLevel::Basic,
        &STANDARD_PROFILE,
        &[
            Rule::ActiveMember,
            Rule::MembershipPrivilege,
            Rule::ResourceCapacity,
            Rule::ValidTime,
        ],
    ),
    (PolicyLevel::Standard, &STANDARD_PROFILE, &FULL_RULE_SET),
    (PolicyLevel::Strict, &RESTRICTIVE_PROFILE, &FULL_RULE_SET),
];

/// Profile a level builds its rules from; `Custom` uses the standard one
pub fn profile_for(level: PolicyLevel) -> RuleProfile {
    LEVEL_TABLE
        .iter()
        .find(|(candidate, _, _)| *candidate == level)
        .map_or(STANDARD_PROFILE, |(_, profile, _)| **profile)
}

impl EligibilityPolicy {
    /// Policy for a predefined level
    pub fn for_level(level: PolicyLevel) -> DomainResult<Self> {
        let (_, profile, rules) = LEVEL_TABLE
            .iter()
            .find(|(candidate, _, _)| *candidate == level)
            .ok_or_else(|| {
                DomainError::InvalidConfiguration(format!(
                    "Policy level '{}' requires explicit rules",
                    level
                ))
            })?;
        Self::from_profile(&format!("flexible:{}", level), profile, rules)
    }
}

enum Entry {
    Named(Rule),
    Custom(SharedSpecification<ReservationContext>),
}

/// Assemble an eligibility policy from any mix of named and custom leaves
pub struct PolicyBuilder {
    name: String,
    profile: RuleProfile,
    mode: CombinationMode,
    entries: Vec<Entry>,
}

impl PolicyBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            profile: STANDARD_PROFILE,
            mode: CombinationMode::All,
            entries: Vec::new(),
        }
    }

    /// Start from a level's profile and rules; `Custom` starts empty
    pub fn from_level(name: &str, level: PolicyLevel) -> Self {
        let mut builder = Self::new(name);
        if let Some((_, profile, rules)) = LEVEL_TABLE.iter().find(|(l, _, _)| *l == level) {
            builder.profile = **profile;
            builder.entries = rules.iter().copied().map(Entry::Named).collect();
        }
        builder
    }

    /// Parameters for named rules added so far and later
    pub fn profile(mut self, profile: RuleProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn mode(mut self, mode: CombinationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.entries.push(Entry::Named(rule));
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.entries.extend(rules.into_iter().map(Entry::Named));
        self
    }

    pub fn specification<S>(mut self, spec: S) -> Self
    where
        S: Specification<ReservationContext> + 'static,
    {
        self.entries.push(Entry::Custom(Arc::new(spec)));
        self
    }

    pub fn build(self) -> DomainResult<EligibilityPolicy> {
        let profile = self.profile;
        let specs = self
            .entries
            .into_iter()
            .map(|entry| match entry {
                Entry::Named(rule) => rule.build(&profile),
                Entry::Custom(spec) => Ok(spec),
            })
            .collect::<DomainResult<Vec<_>>>()?;
        EligibilityPolicy::new(&self.name, specs, self.mode)
    }
}
