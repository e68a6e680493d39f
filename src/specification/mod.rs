// Specification algebra
//
// Boolean predicates over an immutable context snapshot, composable with
// AND / OR / NOT. Composites never read the context themselves; only leaves
// do. `AND` evaluates its right side only when the left side holds, `OR` only
// when the left side fails.

pub mod context;
pub mod member;
pub mod resource;
pub mod schedule;

pub use context::{ReservationContext, ReservationContextBuilder};
pub use member::{
    ActiveMemberSpecification, AdvanceBookingLimitSpecification,
    MembershipPrivilegeSpecification, SimultaneousReservationLimitSpecification, UpgradeAdvisor,
};
pub use resource::ResourceCapacitySpecification;
pub use schedule::{
    RestrictionMode, TimeSlotRestrictionSpecification, ValidReservationTimeSpecification,
};

use crate::error::{DomainError, DomainResult};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A named boolean rule over a context `C`
///
/// Implementations must be pure: evaluating the same specification twice on
/// the same context yields the same answer and the same description.
pub trait Specification<C>: Send + Sync {
    /// Check whether the context satisfies this rule
    fn is_satisfied_by(&self, context: &C) -> bool;

    /// Human-readable statement of the rule
    fn description(&self) -> String;

    /// Why the rule does not hold, or `None` when it does
    fn failure_reason(&self, context: &C) -> Option<String> {
        if self.is_satisfied_by(context) {
            None
        } else {
            Some(format!("Rule not satisfied: {}", self.description()))
        }
    }

    /// Combine with another specification using AND
    fn and<S>(self, other: S) -> AndSpecification<C>
    where
        Self: Sized + 'static,
        S: Specification<C> + 'static,
    {
        AndSpecification::new(Arc::new(self), Arc::new(other))
    }

    /// Combine with another specification using OR
    fn or<S>(self, other: S) -> OrSpecification<C>
    where
        Self: Sized + 'static,
        S: Specification<C> + 'static,
    {
        OrSpecification::new(Arc::new(self), Arc::new(other))
    }

    /// Negate this specification
    fn not(self) -> NotSpecification<C>
    where
        Self: Sized + 'static,
    {
        NotSpecification::new(Arc::new(self))
    }
}

/// Shared, type-erased specification
pub type SharedSpecification<C> = Arc<dyn Specification<C>>;

impl<C, S> Specification<C> for Arc<S>
where
    S: Specification<C> + ?Sized,
{
    fn is_satisfied_by(&self, context: &C) -> bool {
        (**self).is_satisfied_by(context)
    }

    fn description(&self) -> String {
        (**self).description()
    }

    fn failure_reason(&self, context: &C) -> Option<String> {
        (**self).failure_reason(context)
    }
}

/// Both children must hold; the right child is skipped when the left fails
pub struct AndSpecification<C> {
    left: SharedSpecification<C>,
    right: SharedSpecification<C>,
}

impl<C> AndSpecification<C> {
    pub fn new(left: SharedSpecification<C>, right: SharedSpecification<C>) -> Self {
        Self { left, right }
    }
}

impl<C> Specification<C> for AndSpecification<C> {
    fn is_satisfied_by(&self, context: &C) -> bool {
        self.left.is_satisfied_by(context) && self.right.is_satisfied_by(context)
    }

    fn description(&self) -> String {
        format!(
            "({}) AND ({})",
            self.left.description(),
            self.right.description()
        )
    }

    fn failure_reason(&self, context: &C) -> Option<String> {
        let reasons: Vec<String> = [&self.left, &self.right]
            .into_iter()
            .filter_map(|child| child.failure_reason(context))
            .collect();
        if reasons.is_empty() {
            None
        } else {
            Some(reasons.join("; "))
        }
    }
}

/// Either child must hold; the right child is skipped when the left holds
pub struct OrSpecification<C> {
    left: SharedSpecification<C>,
    right: SharedSpecification<C>,
}

impl<C> OrSpecification<C> {
    pub fn new(left: SharedSpecification<C>, right: SharedSpecification<C>) -> Self {
        Self { left, right }
    }
}

impl<C> Specification<C> for OrSpecification<C> {
    fn is_satisfied_by(&self, context: &C) -> bool {
        self.left.is_satisfied_by(context) || self.right.is_satisfied_by(context)
    }

    fn description(&self) -> String {
        format!(
            "({}) OR ({})",
            self.left.description(),
            self.right.description()
        )
    }

    fn failure_reason(&self, context: &C) -> Option<String> {
        if self.is_satisfied_by(context) {
            return None;
        }
        let left = self.left.failure_reason(context);
        let right = self.right.failure_reason(context);
        match (left, right) {
            (Some(l), Some(r)) => Some(format!("{} and {}", l, r)),
            (Some(reason), None) | (None, Some(reason)) => Some(reason),
            (None, None) => Some(format!("Rule not satisfied: {}", self.description())),
        }
    }
}

/// Inverts its child
pub struct NotSpecification<C> {
    inner: SharedSpecification<C>,
}

impl<C> NotSpecification<C> {
    pub fn new(inner: SharedSpecification<C>) -> Self {
        Self { inner }
    }
}

impl<C> Specification<C> for NotSpecification<C> {
    fn is_satisfied_by(&self, context: &C) -> bool {
        !self.inner.is_satisfied_by(context)
    }

    fn description(&self) -> String {
        format!("NOT ({})", self.inner.description())
    }

    fn failure_reason(&self, context: &C) -> Option<String> {
        if self.is_satisfied_by(context) {
            None
        } else {
            Some(format!("Expected not to hold: {}", self.inner.description()))
        }
    }
}

/// Leaf backed by a closure, for ad-hoc rules
pub struct PredicateSpecification<C, F> {
    description: String,
    predicate: F,
    _context: PhantomData<fn(&C)>,
}

impl<C, F> Specification<C> for PredicateSpecification<C, F>
where
    F: Fn(&C) -> bool + Send + Sync,
{
    fn is_satisfied_by(&self, context: &C) -> bool {
        (self.predicate)(context)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

impl<C, F> fmt::Debug for PredicateSpecification<C, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateSpecification")
            .field("description", &self.description)
            .finish()
    }
}

/// Create a specification from a description and a closure
pub fn predicate<C, F>(description: impl Into<String>, predicate: F) -> PredicateSpecification<C, F>
where
    F: Fn(&C) -> bool + Send + Sync,
{
    PredicateSpecification {
        description: description.into(),
        predicate,
        _context: PhantomData,
    }
}

/// Fold a non-empty list into a left-nested AND-chain
pub fn all_of<C: 'static>(specs: Vec<SharedSpecification<C>>) -> DomainResult<SharedSpecification<C>> {
    chain(specs, |left, right| -> SharedSpecification<C> {
        Arc::new(AndSpecification::new(left, right))
    })
}

/// Fold a non-empty list into a left-nested OR-chain
pub fn any_of<C: 'static>(specs: Vec<SharedSpecification<C>>) -> DomainResult<SharedSpecification<C>> {
    chain(specs, |left, right| -> SharedSpecification<C> {
        Arc::new(OrSpecification::new(left, right))
    })
}

fn chain<C>(
    specs: Vec<SharedSpecification<C>>,
    combine: impl Fn(SharedSpecification<C>, SharedSpecification<C>) -> SharedSpecification<C>,
) -> DomainResult<SharedSpecification<C>> {
    let mut iter = specs.into_iter();
    let first = iter
        .next()
        .ok_or(DomainError::EmptyPolicyList("specification chain"))?;
    Ok(iter.fold(first, combine))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Candidate {
        age: u32,
        active: bool,
    }

    struct AdultSpec;

    impl Specification<Candidate> for AdultSpec {
        fn is_satisfied_by(&self, candidate: &Candidate) -> bool {
            candidate.age >= 18
        }

        fn description(&self) -> String {
            "Candidate is an adult".to_string()
        }
    }

    struct ActiveSpec;

    impl Specification<Candidate> for ActiveSpec {
        fn is_satisfied_by(&self, candidate: &Candidate) -> bool {
            candidate.active
        }

        fn description(&self) -> String {
            "Candidate is active".to_string()
        }

        fn failure_reason(&self, candidate: &Candidate) -> Option<String> {
            (!candidate.active).then(|| "Candidate is inactive".to_string())
        }
    }

    /// Counts how often it is evaluated
    struct CountingSpec {
        calls: Arc<AtomicUsize>,
        result: bool,
    }

    impl Specification<Candidate> for CountingSpec {
        fn is_satisfied_by(&self, _candidate: &Candidate) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
        }

        fn description(&self) -> String {
            "counting".to_string()
        }
    }

    fn counting(result: bool) -> (CountingSpec, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            CountingSpec {
                calls: calls.clone(),
                result,
            },
            calls,
        )
    }

    #[test]
    fn test_and_truth_table() {
        let spec = AdultSpec.and(ActiveSpec);
        assert!(spec.is_satisfied_by(&Candidate { age: 20, active: true }));
        assert!(!spec.is_satisfied_by(&Candidate { age: 20, active: false }));
        assert!(!spec.is_satisfied_by(&Candidate { age: 10, active: true }));
        assert!(!spec.is_satisfied_by(&Candidate { age: 10, active: false }));
    }

    #[test]
    fn test_or_truth_table() {
        let spec = AdultSpec.or(ActiveSpec);
        assert!(spec.is_satisfied_by(&Candidate { age: 20, active: true }));
        assert!(spec.is_satisfied_by(&Candidate { age: 20, active: false }));
        assert!(spec.is_satisfied_by(&Candidate { age: 10, active: true }));
        assert!(!spec.is_satisfied_by(&Candidate { age: 10, active: false }));
    }

    #[test]
    fn test_not_inverts() {
        let spec = AdultSpec.not();
        assert!(spec.is_satisfied_by(&Candidate { age: 10, active: true }));
        assert!(!spec.is_satisfied_by(&Candidate { age: 30, active: true }));
    }

    #[test]
    fn test_and_short_circuits() {
        let (left, left_calls) = counting(false);
        let (right, right_calls) = counting(true);
        let spec = left.and(right);

        assert!(!spec.is_satisfied_by(&Candidate { age: 1, active: true }));
        assert_eq!(left_calls.load(Ordering::SeqCst), 1);
        assert_eq!(right_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_or_short_circuits() {
        let (left, left_calls) = counting(true);
        let (right, right_calls) = counting(false);
        let spec = left.or(right);

        assert!(spec.is_satisfied_by(&Candidate { age: 1, active: true }));
        assert_eq!(left_calls.load(Ordering::SeqCst), 1);
        assert_eq!(right_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_and_evaluates_right_when_left_holds() {
        let (left, left_calls) = counting(true);
        let (right, right_calls) = counting(false);
        let spec = left.and(right);

        assert!(!spec.is_satisfied_by(&Candidate { age: 1, active: true }));
        assert_eq!(left_calls.load(Ordering::SeqCst), 1);
        assert_eq!(right_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_composite_descriptions() {
        let spec = AdultSpec.and(ActiveSpec.not());
        assert_eq!(
            spec.description(),
            "(Candidate is an adult) AND (NOT (Candidate is active))"
        );

        let spec = AdultSpec.or(ActiveSpec);
        assert_eq!(
            spec.description(),
            "(Candidate is an adult) OR (Candidate is active)"
        );
    }

    #[test]
    fn test_description_is_deterministic() {
        let spec = AdultSpec.and(ActiveSpec).or(AdultSpec.not());
        let candidate = Candidate { age: 40, active: false };
        let first = (spec.is_satisfied_by(&candidate), spec.description());
        let second = (spec.is_satisfied_by(&candidate), spec.description());
        assert_eq!(first, second);
    }

    #[test]
    fn test_and_failure_reason_collects_both_children() {
        let spec = AdultSpec.and(ActiveSpec);
        let reason = spec
            .failure_reason(&Candidate { age: 10, active: false })
            .unwrap();
        assert!(reason.contains("Candidate is an adult"));
        assert!(reason.contains("Candidate is inactive"));

        assert!(spec.failure_reason(&Candidate { age: 30, active: true }).is_none());
    }

    #[test]
    fn test_predicate_specification() {
        let senior = predicate("Candidate is a senior", |c: &Candidate| c.age >= 65);
        assert!(senior.is_satisfied_by(&Candidate { age: 70, active: true }));
        assert_eq!(senior.description(), "Candidate is a senior");
    }

    #[test]
    fn test_all_of_and_any_of() {
        let specs: Vec<SharedSpecification<Candidate>> = vec![Arc::new(AdultSpec), Arc::new(ActiveSpec)];
        let all = all_of(specs.clone()).unwrap();
        let any = any_of(specs).unwrap();

        let candidate = Candidate { age: 30, active: false };
        assert!(!all.is_satisfied_by(&candidate));
        assert!(any.is_satisfied_by(&candidate));
    }

    #[test]
    fn test_empty_chain_is_rejected() {
        let empty: Vec<SharedSpecification<Candidate>> = Vec::new();
        assert!(matches!(
            all_of(empty),
            Err(DomainError::EmptyPolicyList(_))
        ));
    }
}
