// Validation utilities module
// Construction-time checks shared by entities, rules, policies and config DTOs

use crate::error::{DomainError, DomainResult};
use rust_decimal::Decimal;
use validator::ValidationError;

/// Reject empty or whitespace-only text, returning the trimmed value
pub fn require_non_blank(field: &'static str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::BlankField(field));
    }
    Ok(trimmed.to_string())
}

/// Reject rates outside [0, 1]
pub fn require_unit_rate(rate: Decimal) -> DomainResult<Decimal> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(DomainError::InvalidRate(rate));
    }
    Ok(rate)
}

/// Reject ratios outside (0, 1]; a zero ceiling would block every booking
pub fn require_ceiling_ratio(ratio: Decimal) -> DomainResult<Decimal> {
    if ratio <= Decimal::ZERO || ratio > Decimal::ONE {
        return Err(DomainError::InvalidRate(ratio));
    }
    Ok(ratio)
}

/// validator hook: rate must lie in [0, 1]
pub fn validate_unit_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if *rate < Decimal::ZERO || *rate > Decimal::ONE {
        Err(ValidationError::new("rate_out_of_range"))
    } else {
        Ok(())
    }
}

/// validator hook: amount must be strictly positive
pub fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        Err(ValidationError::new("amount_must_be_positive"))
    } else {
        Ok(())
    }
}

/// validator hook: "HH:MM" wall-clock time
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    parse_time_of_day(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_time_format"))
}

/// Parse "HH:MM" into a `NaiveTime`
pub fn parse_time_of_day(value: &str) -> DomainResult<chrono::NaiveTime> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 2 {
        return Err(DomainError::InvalidConfiguration(format!(
            "Invalid time format '{}': expected HH:MM",
            value
        )));
    }

    let hour: u32 = parts[0].parse().map_err(|_| {
        DomainError::InvalidConfiguration(format!("Invalid hour in time '{}'", value))
    })?;
    let minute: u32 = parts[1].parse().map_err(|_| {
        DomainError::InvalidConfiguration(format!("Invalid minute in time '{}'", value))
    })?;

    if hour >= 24 {
        return Err(DomainError::InvalidConfiguration(format!(
            "Hour must be 0-23 in time '{}'",
            value
        )));
    }
    if minute >= 60 {
        return Err(DomainError::InvalidConfiguration(format!(
            "Minute must be 0-59 in time '{}'",
            value
        )));
    }

    chrono::NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        DomainError::InvalidConfiguration(format!("Invalid time '{}'", value))
    })
}
