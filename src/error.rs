// Error types for the Reservation Rules engine
// Construction-time validation failures and arithmetic errors share one enum

use crate::values::Currency;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the reservation rules engine
///
/// Evaluation never produces these: a rule that does not hold returns
/// `false` or leaves the price untouched. Errors are raised while building
/// value objects, rules, policies and snapshots.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Generic validation failure with a descriptive message
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A required text field was empty or whitespace
    #[error("Field '{0}' must not be blank")]
    BlankField(&'static str),

    /// A rate outside the closed range [0, 1]
    #[error("Rate {0} is outside the range [0, 1]")]
    InvalidRate(Decimal),

    /// Negative or zero amounts where a positive one is required
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Arithmetic between two different currencies
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    /// Interval whose start comes after its end
    #[error("Invalid interval: start {start} is after end {end}")]
    InvalidInterval { start: String, end: String },

    /// Composite built without children
    #[error("Policy list must not be empty: {0}")]
    EmptyPolicyList(&'static str),

    /// Money divided by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Invalid rule or policy configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Entity missing from a store
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// JSON parsing of rule configuration
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for reservation rules operations
pub type DomainResult<T> = Result<T, DomainError>;

impl From<validator::ValidationErrors> for DomainError {
    fn from(err: validator::ValidationErrors) -> Self {
        DomainError::Validation(err.to_string())
    }
}

impl DomainError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
